use crate::color::parse_color_or_black;
use crate::error::{ChartError, Result};
use crate::ir::{DrawCommand, SceneGraph, TextAnchor};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const FONT_FAMILY: &str = "sans-serif";

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Largest surface side, in pixels, either backend will draw
pub const MAX_SURFACE_SIDE: u32 = 32_768;

/// Pixel size of the surface, at least one pixel each way.
fn surface_size(scene: &SceneGraph) -> Result<(u32, u32)> {
    let side = |v: f64| -> Result<u32> {
        let px = v.ceil().max(1.0);
        if !px.is_finite() || px > MAX_SURFACE_SIDE as f64 {
            return Err(ChartError::Render(format!(
                "surface too large: {}x{} (max side {}px)",
                scene.width, scene.height, MAX_SURFACE_SIDE
            )));
        }
        Ok(px as u32)
    };
    Ok((side(scene.width)?, side(scene.height)?))
}

/// Byte length of an RGB buffer for the given size.
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(3))
        .ok_or_else(|| ChartError::Render(format!("surface too large: {}x{}", width, height)))
}

/// Render a scene graph as an SVG document.
pub fn render_svg(scene: &SceneGraph) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, surface_size(scene)?).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

/// Render a scene graph into an RGB bitmap and encode it as PNG.
pub fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let (width, height) = surface_size(scene)?;
    let mut buffer = vec![0u8; rgb_buffer_len(width, height)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().map_err(render_error)?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .map_err(|e| ChartError::Render(format!("Failed to encode PNG: {}", e)))?;
    }
    Ok(png_bytes)
}

fn to_px(origin: (f64, f64), p: (f64, f64)) -> (i32, i32) {
    ((origin.0 + p.0).round() as i32, (origin.1 + p.1).round() as i32)
}

fn stroke_px(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

/// Execute every draw command in order on the given area.
fn draw_scene<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()> {
    area.fill(&WHITE).map_err(render_error)?;
    let origin = scene.origin;

    for command in &scene.commands {
        match command {
            DrawCommand::DrawRect { tl, br, fill, .. } => {
                let color = parse_color_or_black(fill);
                area.draw(&Rectangle::new([to_px(origin, *tl), to_px(origin, *br)], color.filled()))
                    .map_err(render_error)?;
            }
            DrawCommand::DrawLine { points, stroke, width, dash, .. } => {
                let style = parse_color_or_black(stroke).stroke_width(stroke_px(*width));
                let segments = match dash {
                    Some((on, off)) => dash_segments(points, *on, *off),
                    None => vec![points.clone()],
                };
                for segment in segments {
                    let pixels: Vec<(i32, i32)> = segment.iter().map(|p| to_px(origin, *p)).collect();
                    area.draw(&PathElement::new(pixels, style)).map_err(render_error)?;
                }
            }
            DrawCommand::DrawPolygon { points, fill, .. } => {
                let pixels: Vec<(i32, i32)> = points.iter().map(|p| to_px(origin, *p)).collect();
                area.draw(&Polygon::new(pixels, parse_color_or_black(fill).filled()))
                    .map_err(render_error)?;
            }
            DrawCommand::DrawCircle { center, radius, fill, .. } => {
                area.draw(&Circle::new(
                    to_px(origin, *center),
                    radius.round().max(1.0) as u32,
                    parse_color_or_black(fill).filled(),
                ))
                .map_err(render_error)?;
            }
            DrawCommand::DrawText { pos, text, size, anchor, .. } => {
                let hpos = match anchor {
                    TextAnchor::Start => HPos::Left,
                    TextAnchor::Middle => HPos::Center,
                    TextAnchor::End => HPos::Right,
                };
                let style = (FONT_FAMILY, *size)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(hpos, VPos::Center));
                area.draw_text(text, &style, to_px(origin, *pos))
                    .map_err(render_error)?;
            }
        }
    }
    Ok(())
}

/// Split a polyline into the visible pieces of an `on`/`off` dash pattern.
pub fn dash_segments(points: &[(f64, f64)], on: f64, off: f64) -> Vec<Vec<(f64, f64)>> {
    if on <= 0.0 || off <= 0.0 || points.len() < 2 {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = vec![points[0]];
    let mut drawing = true;
    let mut remaining = on;

    for pair in points.windows(2) {
        let (mut x, mut y) = pair[0];
        let (x1, y1) = pair[1];
        let mut length = ((x1 - x).powi(2) + (y1 - y).powi(2)).sqrt();

        while length > 0.0 {
            let step = remaining.min(length);
            let t = step / length;
            x += (x1 - x) * t;
            y += (y1 - y) * t;
            length -= step;
            remaining -= step;

            if drawing {
                current.push((x, y));
            }
            if remaining <= 0.0 {
                if drawing {
                    segments.push(std::mem::take(&mut current));
                    remaining = off;
                } else {
                    current = vec![(x, y)];
                    remaining = on;
                }
                drawing = !drawing;
            }
        }
    }
    if drawing && current.len() > 1 {
        segments.push(current);
    }
    segments
}
