use crate::config::{
    CanvasConfig, ChartConfig, ChartType, LegendConfig, LegendPosition, LegendStyleConfig,
    MarginConfig, OverlayConfig, StyleConfig,
};
use crate::ir::{Legend, LegendStyle, Margin, Overlay, ResolvedConfig, Size, Style};

pub const DEFAULT_CANVAS: Size = Size { width: 200.0, height: 300.0 };
pub const DEFAULT_MARGIN: Margin = Margin { top: 10.0, right: 30.0, bottom: 20.0, left: 50.0 };

/// Merge a sparse user configuration with the defaults.
///
/// Legend geometry is derived from the resolved canvas and margin, so user
/// overrides of either move the legend along with the canvas edge.
pub fn normalize(config: &ChartConfig) -> ResolvedConfig {
    let user = &config.style;

    let chart_type = user.chart_type.unwrap_or_default();
    let continuous = matches!(chart_type, ChartType::Line | ChartType::Scatter);

    let canvas = Size {
        width: positive_or(user.canvas.width, DEFAULT_CANVAS.width),
        height: positive_or(user.canvas.height, DEFAULT_CANVAS.height),
    };
    let margin = Margin {
        top: non_negative_or(user.margin.top, DEFAULT_MARGIN.top),
        right: non_negative_or(user.margin.right, DEFAULT_MARGIN.right),
        bottom: non_negative_or(user.margin.bottom, DEFAULT_MARGIN.bottom),
        left: non_negative_or(user.margin.left, DEFAULT_MARGIN.left),
    };

    let position = match user.legend.position {
        Some(explicit) => explicit,
        None => Some(LegendPosition::default()),
    };
    let mut legend = LegendStyle {
        position,
        orient: user.legend.orient.unwrap_or_default(),
        translate_x: finite_or(user.legend.translate_x, 0.0),
        translate_y: finite_or(user.legend.translate_y, 0.0),
        width: non_negative_or(user.legend.width, 0.0),
    };
    match legend.position {
        None => legend.width = 0.0,
        Some(LegendPosition::Right) => legend.translate_x = margin.left + canvas.width,
        Some(_) => {}
    }

    // A line or scatter chart cannot host bar overlays
    let (barmode, piston, marker) = if continuous {
        (None, None, None)
    } else {
        (
            Some(user.barmode.unwrap_or_default()),
            overlay(&config.piston),
            overlay(&config.marker),
        )
    };

    let chart_width = margin.left + margin.right + legend.width + canvas.width;
    let chart_height = margin.top + margin.bottom + canvas.height;

    let resolved = ResolvedConfig {
        style: Style {
            chart_type,
            barmode,
            orientation: user.orientation.unwrap_or_default(),
            canvas,
            margin,
            legend,
            chart_width,
            chart_height,
        },
        piston,
        marker,
        threshold: config.threshold.clone().unwrap_or_default(),
        legend: Legend {
            visibility: config.legend.visibility.unwrap_or_default(),
            orient: config.legend.orient.unwrap_or_default(),
        },
        color: config.color.clone(),
    };
    log::debug!(
        "normalized config: {:?}/{:?}, surface {}x{}",
        resolved.style.chart_type,
        resolved.style.barmode,
        resolved.style.chart_width,
        resolved.style.chart_height
    );
    resolved
}

fn overlay(cfg: &OverlayConfig) -> Option<Overlay> {
    cfg.name.as_ref().filter(|n| !n.is_empty()).map(|name| Overlay {
        name: name.clone(),
        fill: cfg.fill.clone().filter(|f| !f.is_empty()),
    })
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn non_negative_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(default)
}

impl From<&ResolvedConfig> for ChartConfig {
    fn from(resolved: &ResolvedConfig) -> Self {
        let style = &resolved.style;
        let overlay = |o: &Option<Overlay>| match o {
            Some(o) => OverlayConfig { name: Some(o.name.clone()), fill: o.fill.clone() },
            None => OverlayConfig::default(),
        };
        ChartConfig {
            style: StyleConfig {
                chart_type: Some(style.chart_type),
                barmode: style.barmode,
                orientation: Some(style.orientation),
                canvas: CanvasConfig {
                    width: Some(style.canvas.width),
                    height: Some(style.canvas.height),
                },
                margin: MarginConfig {
                    top: Some(style.margin.top),
                    right: Some(style.margin.right),
                    bottom: Some(style.margin.bottom),
                    left: Some(style.margin.left),
                },
                legend: LegendStyleConfig {
                    position: Some(style.legend.position),
                    orient: Some(style.legend.orient),
                    translate_x: Some(style.legend.translate_x),
                    translate_y: Some(style.legend.translate_y),
                    width: Some(style.legend.width),
                },
            },
            piston: overlay(&resolved.piston),
            marker: overlay(&resolved.marker),
            threshold: if resolved.threshold.is_empty() {
                None
            } else {
                Some(resolved.threshold.clone())
            },
            legend: LegendConfig {
                visibility: Some(resolved.legend.visibility),
                orient: Some(resolved.legend.orient),
            },
            color: resolved.color.clone(),
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        normalize(&ChartConfig::default())
    }
}
