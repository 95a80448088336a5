use crate::document::Document;
use crate::ir::{DrawCommand, MarkClass, SceneGraph, TextAnchor};
use std::collections::BTreeMap;

/// Heuristic: estimate pixel width of text (plotters has no text measuring
/// without a loaded font).
pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * font_px * 0.6
}

/// Horizontal extent of one draw command.
fn horizontal_extent(command: &DrawCommand) -> Option<(f64, f64)> {
    match command {
        DrawCommand::DrawRect { tl, br, .. } => Some((tl.0.min(br.0), tl.0.max(br.0))),
        DrawCommand::DrawText { pos, text, size, anchor, .. } => {
            let w = estimate_text_width_px(text, *size);
            Some(match anchor {
                TextAnchor::Start => (pos.0, pos.0 + w),
                TextAnchor::Middle => (pos.0 - w / 2.0, pos.0 + w / 2.0),
                TextAnchor::End => (pos.0 - w, pos.0),
            })
        }
        DrawCommand::DrawCircle { center, radius, .. } => Some((center.0 - radius, center.0 + radius)),
        DrawCommand::DrawLine { points, .. } | DrawCommand::DrawPolygon { points, .. } => {
            points.iter().map(|p| p.0).fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
            })
        }
    }
}

/// Bounding-box widths of every legend item in a scene, by item index.
pub fn legend_item_widths(scene: &SceneGraph) -> BTreeMap<usize, f64> {
    let mut extents: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for command in &scene.commands {
        let MarkClass::LegendItem(i) = command.class() else { continue };
        let Some((lo, hi)) = horizontal_extent(command) else { continue };
        extents
            .entry(i)
            .and_modify(|e| *e = (e.0.min(lo), e.1.max(hi)))
            .or_insert((lo, hi));
    }
    extents.into_iter().map(|(i, (lo, hi))| (i, hi - lo)).collect()
}

/// Page-level sizing for every chart mounted in a document.
pub struct ChartHandler;

impl ChartHandler {
    /// Widest legend item across all surfaces, or 0 when no legend is drawn.
    pub fn max_legend_width(document: &Document) -> f64 {
        document
            .surfaces()
            .iter()
            .flat_map(|s| legend_item_widths(&s.scene).into_values())
            .fold(0.0, f64::max)
    }

    /// Widen every surface by the widest legend item so legends drawn past
    /// the canvas edge are not clipped. Returns the amount added.
    pub fn adjust_chart_width(document: &mut Document) -> f64 {
        let extra = Self::max_legend_width(document);
        for surface in document.surfaces_mut() {
            surface.scene.width += extra;
        }
        log::debug!(
            "widened {} surfaces by {}px",
            document.surfaces().len(),
            extra
        );
        extra
    }
}
