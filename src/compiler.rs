use crate::config::{BarMode, ChartType, Orientation, Visibility};
use crate::data::Dataset;
use crate::ir::{DrawCommand, Figure, MarkClass, ReshapedData, ResolvedConfig, SceneGraph, TextAnchor};
use crate::scale::BandScale;

pub const AXIS_FONT_SIZE: f64 = 10.0;
pub const LEGEND_FONT_SIZE: f64 = 12.0;
pub const LEGEND_RECT_SIZE: f64 = 18.0;
pub const LEGEND_SPACING: f64 = 4.0;

const CANVAS_FILL: &str = "#ffffff";
const AXIS_COLOR: &str = "#000000";
const GRID_COLOR: &str = "#dddddd";
const THRESHOLD_COLOR: &str = "red";
const THRESHOLD_DASH: (f64, f64) = (15.0, 7.0);
const X_TICK_SIZE: f64 = 5.0;
const Y_TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const SUBGROUP_PADDING: f64 = 0.05;
const LINE_WIDTH: f64 = 1.5;
const POINT_RADIUS: f64 = 3.0;
/// Diamond glyph drawn for each marker value, centered on the point
const MARKER_GLYPH: [(f64, f64); 4] = [(-20.0, 0.0), (0.0, -5.0), (20.0, 0.0), (0.0, 5.0)];

/// Compile resolved config, reshaped data and scales into a SceneGraph.
pub fn compile_geometry(
    config: &ResolvedConfig,
    data: &Dataset,
    reshaped: &ReshapedData,
    figure: &Figure,
) -> SceneGraph {
    let mut commands = Vec::new();
    let canvas = config.style.canvas;

    // Background rectangle for the plotting area
    commands.push(DrawCommand::DrawRect {
        tl: (0.0, 0.0),
        br: (canvas.width, canvas.height),
        fill: CANVAS_FILL.to_string(),
        class: MarkClass::Canvas,
    });

    draw_x_axis(&mut commands, config, figure);
    draw_y_axis(&mut commands, config, figure);

    match (config.style.chart_type, config.style.barmode) {
        (ChartType::Bar, Some(BarMode::Grouped)) => draw_grouped_bars(&mut commands, data, reshaped, figure),
        (ChartType::Bar, Some(BarMode::Stacked)) => draw_stacked_bars(&mut commands, data, reshaped, figure),
        (ChartType::Bar, None) => {}
        (ChartType::Line, _) => draw_lines(&mut commands, data, reshaped, figure),
        (ChartType::Scatter, _) => draw_points(&mut commands, data, reshaped, figure),
    }

    draw_thresholds(&mut commands, config, figure);
    draw_piston(&mut commands, config, data, reshaped, figure);
    draw_marker(&mut commands, config, data, reshaped, figure);

    if config.legend.visibility == Visibility::Show {
        draw_legend(&mut commands, config, reshaped, figure);
    }

    SceneGraph {
        width: config.style.chart_width,
        height: config.style.chart_height,
        origin: (config.style.margin.left, config.style.margin.top),
        commands,
    }
}

fn draw_x_axis(commands: &mut Vec<DrawCommand>, config: &ResolvedConfig, figure: &Figure) {
    let canvas = config.style.canvas;
    let h = canvas.height;
    commands.push(DrawCommand::DrawLine {
        points: vec![(0.0, h), (canvas.width, h)],
        stroke: AXIS_COLOR.to_string(),
        width: 1.0,
        dash: None,
        class: MarkClass::XAxis,
    });
    for (x, label) in figure.x_scale.ticks(figure.format_x_tick) {
        commands.push(DrawCommand::DrawLine {
            points: vec![(x, h), (x, h + X_TICK_SIZE)],
            stroke: AXIS_COLOR.to_string(),
            width: 1.0,
            dash: None,
            class: MarkClass::XAxis,
        });
        commands.push(DrawCommand::DrawText {
            pos: (x, h + X_TICK_SIZE + TICK_PADDING + AXIS_FONT_SIZE / 2.0),
            text: label,
            size: AXIS_FONT_SIZE,
            anchor: TextAnchor::Middle,
            class: MarkClass::XAxis,
        });
    }
}

/// Left axis; tick lines span the canvas as horizontal gridlines.
fn draw_y_axis(commands: &mut Vec<DrawCommand>, config: &ResolvedConfig, figure: &Figure) {
    let canvas = config.style.canvas;
    let values = figure.y_scale.ticks(crate::scale::TICK_COUNT);
    let step = crate::scale::tick_step(&values);
    for v in values {
        let y = figure.y_scale.apply(v);
        commands.push(DrawCommand::DrawLine {
            points: vec![(0.0, y), (canvas.width, y)],
            stroke: GRID_COLOR.to_string(),
            width: 1.0,
            dash: None,
            class: MarkClass::YAxis,
        });
        commands.push(DrawCommand::DrawText {
            pos: (-(Y_TICK_SIZE + TICK_PADDING), y),
            text: crate::scale::format_tick(v, step),
            size: AXIS_FONT_SIZE,
            anchor: TextAnchor::End,
            class: MarkClass::YAxis,
        });
    }
    commands.push(DrawCommand::DrawLine {
        points: vec![(0.0, 0.0), (0.0, canvas.height)],
        stroke: AXIS_COLOR.to_string(),
        width: 1.0,
        dash: None,
        class: MarkClass::YAxis,
    });
}

fn color_of(figure: &Figure, key: &str) -> String {
    figure.color.get(key).cloned().unwrap_or_else(|| AXIS_COLOR.to_string())
}

/// Pixel y of the value axis baseline, kept inside the domain.
fn baseline(figure: &Figure) -> f64 {
    figure.y_scale.apply(0.0_f64.clamp(figure.y_min, figure.y_max))
}

fn vertical_rect(x: f64, width: f64, y_a: f64, y_b: f64, fill: String, class: MarkClass) -> DrawCommand {
    DrawCommand::DrawRect {
        tl: (x, y_a.min(y_b)),
        br: (x + width, y_a.max(y_b)),
        fill,
        class,
    }
}

fn draw_grouped_bars(commands: &mut Vec<DrawCommand>, data: &Dataset, reshaped: &ReshapedData, figure: &Figure) {
    // Another band scale for the position of each series inside a category
    let sub = BandScale::new(&reshaped.groups, (0.0, figure.x_scale.bandwidth()), SUBGROUP_PADDING);
    let base = baseline(figure);

    for (row, group) in data.groups().iter().enumerate() {
        let Some(x0) = figure.x_scale.position(group) else { continue };
        for key in &reshaped.groups {
            let (Some(offset), Some(v)) = (sub.apply(key), data.value(row, key)) else { continue };
            commands.push(vertical_rect(
                x0 + offset,
                sub.bandwidth(),
                figure.y_scale.apply(v),
                base,
                color_of(figure, key),
                MarkClass::Bar,
            ));
        }
    }
}

fn draw_stacked_bars(commands: &mut Vec<DrawCommand>, data: &Dataset, reshaped: &ReshapedData, figure: &Figure) {
    let Some(stacked) = &reshaped.stacked else { return };
    let bw = figure.x_scale.bandwidth();

    // Series by series, then row by row
    for series in stacked {
        let fill = color_of(figure, &series.key);
        for (group, [start, end]) in data.groups().iter().zip(series.intervals.iter()) {
            let Some(x) = figure.x_scale.position(group) else { continue };
            commands.push(vertical_rect(
                x,
                bw,
                figure.y_scale.apply(*start),
                figure.y_scale.apply(*end),
                fill.clone(),
                MarkClass::Bar,
            ));
        }
    }
}

fn series_points(data: &Dataset, key: &str, figure: &Figure) -> Vec<(f64, f64)> {
    data.groups()
        .iter()
        .enumerate()
        .filter_map(|(row, group)| {
            let x = figure.x_scale.center(group)?;
            let v = data.value(row, key)?;
            Some((x, figure.y_scale.apply(v)))
        })
        .collect()
}

fn draw_lines(commands: &mut Vec<DrawCommand>, data: &Dataset, reshaped: &ReshapedData, figure: &Figure) {
    for key in &reshaped.groups {
        commands.push(DrawCommand::DrawLine {
            points: series_points(data, key, figure),
            stroke: color_of(figure, key),
            width: LINE_WIDTH,
            dash: None,
            class: MarkClass::Line,
        });
    }
}

fn draw_points(commands: &mut Vec<DrawCommand>, data: &Dataset, reshaped: &ReshapedData, figure: &Figure) {
    for key in &reshaped.groups {
        let fill = color_of(figure, key);
        for center in series_points(data, key, figure) {
            commands.push(DrawCommand::DrawCircle {
                center,
                radius: POINT_RADIUS,
                fill: fill.clone(),
                class: MarkClass::Point,
            });
        }
    }
}

fn draw_thresholds(commands: &mut Vec<DrawCommand>, config: &ResolvedConfig, figure: &Figure) {
    for t in &config.threshold {
        let y = figure.y_scale.apply(t.value);
        commands.push(DrawCommand::DrawLine {
            points: vec![(0.0, y), (config.style.canvas.width, y)],
            stroke: THRESHOLD_COLOR.to_string(),
            width: 2.0,
            dash: Some(THRESHOLD_DASH),
            class: MarkClass::Threshold,
        });
        commands.push(DrawCommand::DrawText {
            pos: (0.0, y - 5.0 - AXIS_FONT_SIZE / 2.0),
            text: t.name.clone(),
            size: AXIS_FONT_SIZE,
            anchor: TextAnchor::Start,
            class: MarkClass::Threshold,
        });
    }
}

/// Narrow bar centered in each band; only drawn over stacked bars.
fn draw_piston(
    commands: &mut Vec<DrawCommand>,
    config: &ResolvedConfig,
    data: &Dataset,
    reshaped: &ReshapedData,
    figure: &Figure,
) {
    let (Some(piston), Some(values)) = (&config.piston, &reshaped.piston) else { return };
    if config.style.barmode != Some(BarMode::Stacked) {
        log::warn!("piston '{}' ignored: pistons need stacked bars", piston.name);
        return;
    }
    let bw = figure.x_scale.bandwidth();
    let fill = piston.fill.clone().unwrap_or_else(|| color_of(figure, &piston.name));
    for (group, &v) in data.groups().iter().zip(values.iter()) {
        let Some(x) = figure.x_scale.position(group) else { continue };
        commands.push(vertical_rect(
            x + bw * (3.0 / 8.0),
            bw / 4.0,
            figure.y_scale.apply(v),
            config.style.canvas.height,
            fill.clone(),
            MarkClass::Piston,
        ));
    }
}

fn draw_marker(
    commands: &mut Vec<DrawCommand>,
    config: &ResolvedConfig,
    data: &Dataset,
    reshaped: &ReshapedData,
    figure: &Figure,
) {
    let (Some(marker), Some(values)) = (&config.marker, &reshaped.marker) else { return };
    let fill = marker.fill.clone().unwrap_or_else(|| color_of(figure, &marker.name));
    for (group, &v) in data.groups().iter().zip(values.iter()) {
        let Some(cx) = figure.x_scale.center(group) else { continue };
        let cy = figure.y_scale.apply(v);
        commands.push(DrawCommand::DrawPolygon {
            points: MARKER_GLYPH.iter().map(|(dx, dy)| (cx + dx, cy + dy)).collect(),
            fill: fill.clone(),
            class: MarkClass::Marker,
        });
    }
}

/// Top-left corner of legend item `index` relative to the legend container.
pub fn legend_item_offset(orient: Orientation, index: usize, count: usize) -> (f64, f64) {
    let height = LEGEND_RECT_SIZE + LEGEND_SPACING;
    match orient {
        Orientation::Vertical => (-2.0 * LEGEND_RECT_SIZE, index as f64 * height),
        Orientation::Horizontal => {
            let offset = height * count as f64 / 2.0;
            let horz = LEGEND_RECT_SIZE + offset;
            (index as f64 * horz, 0.0)
        }
    }
}

fn draw_legend(commands: &mut Vec<DrawCommand>, config: &ResolvedConfig, reshaped: &ReshapedData, figure: &Figure) {
    let legend = &config.style.legend;
    let count = reshaped.groups.len();
    for (i, key) in reshaped.groups.iter().enumerate() {
        let (dx, dy) = legend_item_offset(config.legend.orient, i, count);
        let x = legend.translate_x + dx;
        let y = legend.translate_y + dy;
        commands.push(DrawCommand::DrawRect {
            tl: (x, y),
            br: (x + LEGEND_RECT_SIZE, y + LEGEND_RECT_SIZE),
            fill: color_of(figure, key),
            class: MarkClass::LegendItem(i),
        });
        commands.push(DrawCommand::DrawText {
            pos: (x + LEGEND_RECT_SIZE + LEGEND_SPACING, y + LEGEND_RECT_SIZE / 2.0),
            text: key.clone(),
            size: LEGEND_FONT_SIZE,
            anchor: TextAnchor::Start,
            class: MarkClass::LegendItem(i),
        });
    }
}
