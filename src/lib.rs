// Library exports for barchart

pub mod chart;
pub mod color;
pub mod config;
pub mod csv_reader;
pub mod data;
pub mod document;
pub mod error;
pub mod graph;
pub mod handler;
pub mod palette;
pub mod toggler;

// Pipeline phases
pub mod ir;
pub mod resolve;
pub mod transform;
pub mod scale;
pub mod compiler;

pub use chart::Chart;
pub use config::ChartConfig;
pub use data::{AxisKind, Dataset};
pub use document::Document;
pub use error::{ChartError, Result};
pub use handler::ChartHandler;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "svg")]
    #[default]
    Svg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "html")]
    Html,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    #[serde(default = "default_mount")]
    pub mount: String,
    /// Widen the surface by the widest legend item after drawing
    #[serde(default)]
    pub adjust_legend: bool,
}

fn default_mount() -> String { "chart".to_string() }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            mount: default_mount(),
            adjust_legend: false,
        }
    }
}

/// Draw a single chart on a fresh page and encode it in the requested format.
pub fn render_chart(dataset: &Dataset, config: &ChartConfig, options: &RenderOptions) -> Result<Vec<u8>> {
    let mut document = Document::new();
    document.add_element(Some(options.mount.as_str()), &[]);
    let chart = Chart::new(&mut document, &options.mount, dataset, config)?;
    if options.adjust_legend {
        ChartHandler::adjust_chart_width(&mut document);
    }

    match options.format {
        OutputFormat::Html => Ok(document.render_html()?.into_bytes()),
        format => {
            let surface = chart
                .surface(&document)
                .ok_or_else(|| ChartError::MissingMountPoint(options.mount.clone()))?;
            match format {
                OutputFormat::Png => graph::render_png(&surface.scene),
                _ => Ok(graph::render_svg(&surface.scene)?.into_bytes()),
            }
        }
    }
}
