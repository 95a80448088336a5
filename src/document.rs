use crate::error::{ChartError, Result};
use crate::graph::render_svg;
use crate::ir::SceneGraph;

/// A page element that charts mount into or the toggler hides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: Option<String>,
    classes: Vec<String>,
}

impl Element {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Flip `class`; returns whether the element has it afterwards.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }
}

/// A chart drawing attached to a mount point.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub mount_id: String,
    pub scene: SceneGraph,
}

impl Surface {
    pub fn width(&self) -> f64 {
        self.scene.width
    }
}

/// In-process page model: elements in insertion order plus mounted surfaces.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    surfaces: Vec<Surface>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, id: Option<&str>, classes: &[&str]) -> &mut Element {
        self.elements.push(Element {
            id: id.map(str::to_string),
            classes: Vec::new(),
        });
        let idx = self.elements.len() - 1;
        let element = &mut self.elements[idx];
        for class in classes {
            element.add_class(class);
        }
        element
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id.as_deref() == Some(id))
    }

    /// Elements carrying `class`, in document order.
    pub fn query_selector_all(&self, class: &str) -> Vec<&Element> {
        self.elements.iter().filter(|e| e.has_class(class)).collect()
    }

    pub fn query_selector_all_mut(&mut self, class: &str) -> Vec<&mut Element> {
        self.elements.iter_mut().filter(|e| e.has_class(class)).collect()
    }

    /// Attach a surface to an existing element. Nothing changes on failure.
    pub fn mount(&mut self, mount_id: &str, scene: SceneGraph) -> Result<&Surface> {
        if self.get_element_by_id(mount_id).is_none() {
            return Err(ChartError::MissingMountPoint(mount_id.to_string()));
        }
        log::debug!("mounting {}x{} surface into #{}", scene.width, scene.height, mount_id);
        self.surfaces.push(Surface {
            mount_id: mount_id.to_string(),
            scene,
        });
        let idx = self.surfaces.len() - 1;
        Ok(&self.surfaces[idx])
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut [Surface] {
        &mut self.surfaces
    }

    /// Serialize the page, with every surface inlined as SVG inside its
    /// mount element.
    pub fn render_html(&self) -> Result<String> {
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<style>.hide{display:none}</style>\n</head>\n<body>\n");
        for element in &self.elements {
            html.push_str("<div");
            if let Some(id) = &element.id {
                html.push_str(&format!(" id=\"{}\"", escape(id)));
            }
            if !element.classes.is_empty() {
                html.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "))));
            }
            html.push_str(">\n");
            if let Some(id) = &element.id {
                for surface in self.surfaces.iter().filter(|s| &s.mount_id == id) {
                    html.push_str(&render_svg(&surface.scene)?);
                    html.push('\n');
                }
            }
            html.push_str("</div>\n");
        }
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
