use crate::ir::{ResolvedConfig, ReshapedData};
use std::collections::BTreeMap;

/// Categorical palette handed out in series declaration order.
/// Once exhausted, colors are reused from the start.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    pub fn tableau10() -> Self {
        Self {
            colors: vec![
                "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f",
                "#edc949", "#af7aa1", "#ff9da7", "#9c755f", "#bab0ab",
            ],
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color for the `index`-th assignment.
    pub fn color(&self, index: usize) -> &'static str {
        self.colors[index % self.len()]
    }

    /// Give every series without a declared color the next palette color.
    pub fn assign_colors(
        &self,
        series: &[String],
        declared: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut map = declared.clone();
        let mut next = 0;
        for s in series {
            if map.contains_key(s) {
                continue;
            }
            if next == self.len() {
                log::debug!("palette exhausted after {} series, reusing colors", next);
            }
            map.insert(s.clone(), self.color(next).to_string());
            next += 1;
        }
        map
    }
}

/// Color mapping for a chart: declared colors, then palette colors, then
/// overlay fills.
pub fn assign_figure_colors(config: &ResolvedConfig, data: &ReshapedData) -> BTreeMap<String, String> {
    let mut map = ColorPalette::tableau10().assign_colors(&data.series_names, &config.color);
    for overlay in [&config.piston, &config.marker].into_iter().flatten() {
        if let Some(fill) = &overlay.fill {
            map.insert(overlay.name.clone(), fill.clone());
        }
    }
    map
}
