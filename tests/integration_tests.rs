use assert_cmd::Command;
use barchart::config::BarMode;
use barchart::ir::{DrawCommand, MarkClass};
use barchart::toggler::{CommentToggler, MemoryStorage, SessionStorage, HIDE_CLASS, STORAGE_KEY, TOGGLER_ID};
use barchart::{
    csv_reader, render_chart, AxisKind, Chart, ChartConfig, ChartError, ChartHandler, Dataset, Document,
    OutputFormat, RenderOptions,
};
use predicates::prelude::*;
use std::io::Write;

const MONTHS_CSV: &str = "month,a,b\nJan,10,5\nFeb,7,8\n";

fn months() -> Dataset {
    csv_reader::read_dataset_from_str(MONTHS_CSV, AxisKind::Categorical).unwrap()
}

fn page() -> Document {
    let mut doc = Document::new();
    doc.add_element(Some("chart"), &[]);
    doc
}

fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn count(doc: &Document, class: MarkClass) -> usize {
    doc.surfaces()[0]
        .scene
        .commands
        .iter()
        .filter(|c| c.class() == class)
        .count()
}

#[test]
fn test_default_config_draws_stacked_bars() {
    let mut doc = page();
    let chart = Chart::new(&mut doc, "chart", &months(), &ChartConfig::default()).unwrap();

    assert_eq!(chart.config().style.barmode, Some(BarMode::Stacked));
    assert!(chart.y_max() >= 1.1 * 15.0 - 1e-9);
    assert!(chart.color("a").is_some());
    assert!(chart.color("b").is_some());
    assert_ne!(chart.color("a"), chart.color("b"));
    assert_eq!(count(&doc, MarkClass::Bar), 4);
}

#[test]
fn test_line_type_drops_barmode_and_overlays() {
    let mut doc = page();
    let config = ChartConfig::from_json_str(
        r#"{"style": {"type": "line"}, "piston": {"name": "a"}, "marker": {"name": "b"}}"#,
    )
    .unwrap();
    let chart = Chart::new(&mut doc, "chart", &months(), &config).unwrap();

    assert_eq!(chart.config().style.barmode, None);
    assert!(chart.config().piston.is_none());
    assert!(chart.config().marker.is_none());
    assert_eq!(count(&doc, MarkClass::Line), 2);
    assert_eq!(count(&doc, MarkClass::Piston), 0);
    assert_eq!(count(&doc, MarkClass::Marker), 0);
}

#[test]
fn test_missing_mount_point_fails_without_mutation() {
    let mut doc = page();
    let before = doc.elements().to_vec();
    let err = Chart::new(&mut doc, "missing-div", &months(), &ChartConfig::default()).unwrap_err();

    assert!(matches!(err, ChartError::MissingMountPoint(ref id) if id == "missing-div"));
    assert_eq!(err.to_string(), "Chart parent <missing-div> does not exist");
    assert!(doc.surfaces().is_empty());
    assert_eq!(doc.elements(), before.as_slice());
}

#[test]
fn test_unknown_marker_is_reported() {
    let mut doc = page();
    let config = ChartConfig::from_json_str(r#"{"marker": {"name": "target"}}"#).unwrap();
    let err = Chart::new(&mut doc, "chart", &months(), &config).unwrap_err();
    assert!(matches!(err, ChartError::UnknownOverlayColumn(ref name) if name == "target"));
}

#[test]
fn test_threshold_and_overlays_raise_domain() {
    let data = csv_reader::read_dataset_from_str(
        "month,a,b,cap,goal\nJan,10,5,20,12\nFeb,7,8,18,30\n",
        AxisKind::Categorical,
    )
    .unwrap();
    let config = ChartConfig::from_json_str(
        r#"{"piston": {"name": "cap"}, "marker": {"name": "goal"},
            "threshold": [{"name": "limit", "value": 25}]}"#,
    )
    .unwrap();
    let mut doc = page();
    let chart = Chart::new(&mut doc, "chart", &data, &config).unwrap();

    assert_eq!(chart.data().groups, vec!["a", "b"]);
    assert!(chart.y_max() >= 1.1 * 30.0 - 1e-9);
    assert_eq!(count(&doc, MarkClass::Piston), 2);
    assert_eq!(count(&doc, MarkClass::Marker), 2);
    // dashed line and its label
    assert_eq!(count(&doc, MarkClass::Threshold), 2);
}

#[test]
fn test_adjust_chart_width_widens_all_surfaces() {
    let mut doc = page();
    doc.add_element(Some("second"), &[]);
    let shown = ChartConfig::from_json_str(r#"{"legend": {"visibility": "show"}}"#).unwrap();
    Chart::new(&mut doc, "chart", &months(), &shown).unwrap();
    Chart::new(&mut doc, "second", &months(), &ChartConfig::default()).unwrap();

    let before: Vec<f64> = doc.surfaces().iter().map(|s| s.width()).collect();
    let max = ChartHandler::max_legend_width(&doc);
    assert!(max > 0.0);

    let added = ChartHandler::adjust_chart_width(&mut doc);
    assert_eq!(added, max);
    for (surface, width) in doc.surfaces().iter().zip(before) {
        assert!((surface.width() - (width + max)).abs() < 1e-9);
    }
}

#[test]
fn test_legend_items_follow_primary_series() {
    let mut doc = page();
    let config = ChartConfig::from_json_str(r#"{"legend": {"visibility": "show", "orient": "h"}}"#).unwrap();
    Chart::new(&mut doc, "chart", &months(), &config).unwrap();

    let labels: Vec<&str> = doc.surfaces()[0]
        .scene
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawText { text, class: MarkClass::LegendItem(_), .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["a", "b"]);
}

#[test]
fn test_toggler_round_trip() {
    let mut storage = MemoryStorage::new();
    let mut doc = Document::new();
    doc.add_element(Some(TOGGLER_ID), &[]);
    doc.add_element(None, &["cantoggle"]);

    let mut toggler = CommentToggler::load(&mut doc, &storage);
    assert!(toggler.click(&mut doc, &mut storage));
    assert_eq!(storage.get_item(STORAGE_KEY).as_deref(), Some("true"));

    // a fresh page load re-applies the persisted state
    let mut reloaded = Document::new();
    reloaded.add_element(None, &["cantoggle"]);
    let toggler = CommentToggler::load(&mut reloaded, &storage);
    assert!(toggler.hidden());
    assert_eq!(reloaded.query_selector_all(HIDE_CLASS).len(), 1);
}

#[test]
fn test_render_chart_svg_and_html() {
    let svg = render_chart(&months(), &ChartConfig::default(), &RenderOptions::default()).unwrap();
    let svg = String::from_utf8(svg).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("<rect"));

    let options = RenderOptions {
        format: OutputFormat::Html,
        ..Default::default()
    };
    let html = String::from_utf8(render_chart(&months(), &ChartConfig::default(), &options).unwrap()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<div id=\"chart\">"));
}

#[test]
fn test_stacked_layout_across_datasets() {
    let cases = [
        "m,a,b,c\nJan,3,4,5\nFeb,1,1,1\n",
        "m,a,b,c\nJan,-3,-4,-5\nFeb,-1,0,-2\n",
        "m,a,b,c\nJan,1,1,0\nFeb,20,-15,2\nMar,-7.5,12,0.25\n",
        "m,a,b\nJan,0,0\n",
        "m,a,b,c\nJan,40,-39,2\nFeb,0.5,-8.25,12\n",
    ];
    for csv in cases {
        let data = csv_reader::read_dataset_from_str(csv, AxisKind::Categorical).unwrap();
        let mut doc = page();
        let chart = Chart::new(&mut doc, "chart", &data, &ChartConfig::default()).unwrap();
        let layers = chart.data().stacked.as_ref().unwrap();

        for row in 0..data.len() {
            let sum: f64 = chart.data().groups.iter().filter_map(|g| data.value(row, g)).sum();
            let top = layers.last().unwrap().intervals[row][1];
            assert!((top - sum).abs() < 1e-9, "{}: row {} ends at {}", csv, row, top);
        }

        let ends: Vec<f64> = layers.iter().flat_map(|l| l.intervals.iter().flatten().copied()).collect();
        let max = ends.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = ends.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(chart.y_max() > chart.y_min(), "{}", csv);
        assert!(chart.y_max() >= 1.1 * max - 1e-9, "{}: y_max {}", csv, chart.y_max());
        assert!(chart.y_min() <= min, "{}: y_min {}", csv, chart.y_min());
    }
}

#[test]
fn test_render_chart_png() {
    let options = RenderOptions {
        format: OutputFormat::Png,
        ..Default::default()
    };
    let png = render_chart(&months(), &ChartConfig::default(), &options).unwrap();
    assert!(is_valid_png(&png));
}

#[test]
fn test_cli_png_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chart.png");

    Command::cargo_bin("barchart")
        .unwrap()
        .args(["--output", "png", "--out"])
        .arg(&out)
        .write_stdin(MONTHS_CSV)
        .assert()
        .success();

    let png = std::fs::read(&out).unwrap();
    assert!(is_valid_png(&png));
}

#[test]
fn test_cli_svg_to_stdout() {
    let mut data = tempfile::NamedTempFile::new().unwrap();
    data.write_all(MONTHS_CSV.as_bytes()).unwrap();

    Command::cargo_bin("barchart")
        .unwrap()
        .arg("--data")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("<svg"));
}

#[test]
fn test_cli_json_data_and_config_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");
    let config = dir.path().join("config.json");
    let out = dir.path().join("chart.html");
    std::fs::write(&data, r#"[{"month": "Jan", "a": 10, "b": 5}, {"month": "Feb", "a": 7, "b": 8}]"#).unwrap();
    std::fs::write(&config, r#"{"style": {"barmode": "grouped"}, "legend": {"visibility": "show"}}"#).unwrap();

    Command::cargo_bin("barchart")
        .unwrap()
        .args(["--format", "json", "--output", "html", "--adjust-legend"])
        .arg("--data")
        .arg(&data)
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("<svg"));
}

#[test]
fn test_cli_reads_stdin() {
    Command::cargo_bin("barchart")
        .unwrap()
        .write_stdin(MONTHS_CSV)
        .assert()
        .success()
        .stdout(predicate::str::contains("<svg"));
}

#[test]
fn test_cli_reports_unknown_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"piston": {"name": "nope"}}"#).unwrap();

    Command::cargo_bin("barchart")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .write_stdin(MONTHS_CSV)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_cli_rejects_blank_value() {
    Command::cargo_bin("barchart")
        .unwrap()
        .write_stdin("month,a\nJan,\n")
        .assert()
        .failure();
}
