use crate::compiler::compile_geometry;
use crate::config::ChartConfig;
use crate::data::Dataset;
use crate::document::{Document, Surface};
use crate::error::{ChartError, Result};
use crate::ir::{Figure, ReshapedData, ResolvedConfig};
use crate::palette::assign_figure_colors;
use crate::resolve::normalize;
use crate::scale::{build_x_scale, build_y_scale, y_domain};
use crate::transform::reshape;

/// One chart drawn into a document mount point.
#[derive(Debug, Clone)]
pub struct Chart {
    mount_id: String,
    config: ResolvedConfig,
    data: ReshapedData,
    figure: Figure,
    surface_index: usize,
}

impl Chart {
    /// Build a chart and mount its surface in `document` under `mount_id`.
    ///
    /// The document is only modified once every phase has succeeded.
    pub fn new(document: &mut Document, mount_id: &str, dataset: &Dataset, config: &ChartConfig) -> Result<Self> {
        // Phase 1: Normalize
        let config = normalize(config);

        // Phase 2: Reshape
        let data = reshape(&config, dataset)?;

        // Phase 3: Colors
        let color = assign_figure_colors(&config, &data);

        if document.get_element_by_id(mount_id).is_none() {
            return Err(ChartError::MissingMountPoint(mount_id.to_string()));
        }

        // Phase 4: Scales
        let (y_min, y_max) = y_domain(&config, &data, dataset);
        let y_scale = build_y_scale(&config, (y_min, y_max));
        let (x_scale, format_x_tick) = build_x_scale(&config, dataset);
        let figure = Figure {
            color,
            y_min,
            y_max,
            y_scale,
            x_scale,
            format_x_tick,
        };
        log::debug!("y domain for #{}: [{}, {}]", mount_id, y_min, y_max);

        // Phase 5: Compile and mount
        let scene = compile_geometry(&config, dataset, &data, &figure);
        document.mount(mount_id, scene)?;
        let surface_index = document.surfaces().len() - 1;

        Ok(Self {
            mount_id: mount_id.to_string(),
            config,
            data,
            figure,
            surface_index,
        })
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn data(&self) -> &ReshapedData {
        &self.data
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn y_max(&self) -> f64 {
        self.figure.y_max
    }

    pub fn y_min(&self) -> f64 {
        self.figure.y_min
    }

    pub fn color(&self, series: &str) -> Option<&str> {
        self.figure.color.get(series).map(String::as_str)
    }

    /// The surface this chart drew into.
    pub fn surface<'a>(&self, document: &'a Document) -> Option<&'a Surface> {
        document.surfaces().get(self.surface_index)
    }
}
