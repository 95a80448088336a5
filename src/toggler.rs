use crate::document::Document;
use std::collections::HashMap;

pub const STORAGE_KEY: &str = "comment_hidden";
pub const TOGGLE_CLASS: &str = "cantoggle";
pub const HIDE_CLASS: &str = "hide";
pub const TOGGLER_ID: &str = "comment-toggler";

/// String key/value store that lives as long as the browsing session.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }
}

/// Shows or hides every `.cantoggle` element. The hidden flag is read from
/// storage once at load and written back on every click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentToggler {
    hidden: bool,
}

impl CommentToggler {
    pub fn load(document: &mut Document, storage: &dyn SessionStorage) -> Self {
        let hidden = read_flag(storage);
        log::debug!("comment_hidden at load: {}", hidden);
        if hidden {
            for element in document.query_selector_all_mut(TOGGLE_CLASS) {
                element.add_class(HIDE_CLASS);
            }
        }
        Self { hidden }
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Handle a click on `#comment-toggler`. Returns false without touching
    /// anything when the page has no toggler control.
    pub fn click(&mut self, document: &mut Document, storage: &mut dyn SessionStorage) -> bool {
        if document.get_element_by_id(TOGGLER_ID).is_none() {
            return false;
        }
        self.hidden = !self.hidden;
        storage.set_item(STORAGE_KEY, self.hidden.to_string());
        for element in document.query_selector_all_mut(TOGGLE_CLASS) {
            element.toggle_class(HIDE_CLASS);
        }
        true
    }
}

/// Missing or unreadable values count as "shown".
fn read_flag(storage: &dyn SessionStorage) -> bool {
    let Some(raw) = storage.get_item(STORAGE_KEY) else { return false };
    match serde_json::from_str::<Option<bool>>(&raw) {
        Ok(flag) => flag.unwrap_or(false),
        Err(e) => {
            log::warn!("ignoring stored {}={:?}: {}", STORAGE_KEY, raw, e);
            false
        }
    }
}
