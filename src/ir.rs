use crate::config::{BarMode, ChartType, LegendPosition, Orientation, Threshold, Visibility};
use crate::scale::{LinearScale, XScale};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Phase 1: Normalization
// =============================================================================

/// Fully resolved configuration. Every field is concrete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub style: Style,
    pub piston: Option<Overlay>,
    pub marker: Option<Overlay>,
    pub threshold: Vec<Threshold>,
    pub legend: Legend,
    pub color: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub chart_type: ChartType,
    pub barmode: Option<BarMode>,
    pub orientation: Orientation,
    pub canvas: Size,
    pub margin: Margin,
    pub legend: LegendStyle,
    /// margin.left + margin.right + legend.width + canvas.width
    pub chart_width: f64,
    /// margin.top + margin.bottom + canvas.height
    pub chart_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendStyle {
    pub position: Option<LegendPosition>,
    pub orient: Orientation,
    pub translate_x: f64,
    pub translate_y: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub name: String,
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub visibility: Visibility,
    pub orient: Orientation,
}

// =============================================================================
// Phase 2: Reshaping
// =============================================================================

/// Series sets derived from the dataset for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ReshapedData {
    /// Column holding the horizontal group values
    pub group_name: String,
    /// Every declared value column, before overlay extraction
    pub series_names: Vec<String>,
    /// Primary series, with overlay columns removed
    pub groups: Vec<String>,
    pub stacked: Option<Vec<StackSeries>>,
    pub piston: Option<Vec<f64>>,
    pub marker: Option<Vec<f64>>,
}

/// One layer of the stack layout: `[start, end]` per input row.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSeries {
    pub key: String,
    pub intervals: Vec<[f64; 2]>,
}

// =============================================================================
// Phase 3: Figure (colors and scales)
// =============================================================================

#[derive(Debug, Clone)]
pub struct Figure {
    pub color: BTreeMap<String, String>,
    pub y_min: f64,
    pub y_max: f64,
    pub y_scale: LinearScale,
    pub x_scale: XScale,
    /// Tick labels on the x axis are formatted as integers
    pub format_x_tick: bool,
}

// =============================================================================
// Phase 4: Compilation (Scene Graph)
// =============================================================================

/// Everything needed to draw one chart surface.
/// Coordinates in `commands` are relative to the figure origin
/// (`margin.left`, `margin.top`).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub width: f64,
    pub height: f64,
    pub origin: (f64, f64),
    pub commands: Vec<DrawCommand>,
}

/// Which part of the chart a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkClass {
    Canvas,
    XAxis,
    YAxis,
    Bar,
    Line,
    Point,
    Threshold,
    Piston,
    Marker,
    LegendItem(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawRect {
        // Top-Left, Bottom-Right
        tl: (f64, f64),
        br: (f64, f64),
        fill: String,
        class: MarkClass,
    },
    DrawLine {
        points: Vec<(f64, f64)>,
        stroke: String,
        width: f64,
        dash: Option<(f64, f64)>,
        class: MarkClass,
    },
    DrawPolygon {
        points: Vec<(f64, f64)>,
        fill: String,
        class: MarkClass,
    },
    DrawCircle {
        center: (f64, f64),
        radius: f64,
        fill: String,
        class: MarkClass,
    },
    DrawText {
        pos: (f64, f64),
        text: String,
        size: f64,
        anchor: TextAnchor,
        class: MarkClass,
    },
}

impl DrawCommand {
    pub fn class(&self) -> MarkClass {
        match self {
            DrawCommand::DrawRect { class, .. }
            | DrawCommand::DrawLine { class, .. }
            | DrawCommand::DrawPolygon { class, .. }
            | DrawCommand::DrawCircle { class, .. }
            | DrawCommand::DrawText { class, .. } => *class,
        }
    }
}
