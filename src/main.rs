use anyhow::{Context, Result};
use barchart::{csv_reader, AxisKind, ChartConfig, Dataset, OutputFormat, RenderOptions};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DataFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum XKind {
    Categorical,
    Numeric,
    Temporal,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Output {
    Svg,
    Png,
    Html,
}

#[derive(Parser, Debug)]
#[command(name = "barchart", version)]
#[command(about = "Draw bar and line charts from CSV or JSON data", long_about = None)]
struct Args {
    /// Data file; reads stdin when omitted
    #[arg(long)]
    data: Option<PathBuf>,
    /// Data file format
    #[arg(long, value_enum, default_value_t = DataFormat::Csv)]
    format: DataFormat,
    /// How the first column is read
    #[arg(long, value_enum, default_value_t = XKind::Categorical)]
    x_kind: XKind,
    /// JSON chart configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file; writes stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Output::Svg)]
    output: Output,
    /// Id of the element the chart mounts into
    #[arg(long, default_value = "chart")]
    mount: String,
    /// Widen the chart by the widest legend item
    #[arg(long, default_value_t = false)]
    adjust_legend: bool,
}

fn read_dataset(args: &Args) -> Result<Dataset> {
    let x_kind = match args.x_kind {
        XKind::Categorical => AxisKind::Categorical,
        XKind::Numeric => AxisKind::Numeric,
        XKind::Temporal => AxisKind::Temporal,
    };
    let text = match &args.data {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("Failed to read data from stdin")?,
    };
    let dataset = match args.format {
        DataFormat::Csv => csv_reader::read_dataset_from_str(&text, x_kind)?,
        DataFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&text).context("Data is not valid JSON")?;
            Dataset::from_json(&value, x_kind)?
        }
    };
    Ok(dataset)
}

fn read_config(args: &Args) -> Result<ChartConfig> {
    match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ChartConfig::from_json_str(&text).context("Invalid chart configuration")
        }
        None => Ok(ChartConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = read_dataset(&args).context("Failed to load dataset")?;
    let config = read_config(&args)?;
    let options = RenderOptions {
        format: match args.output {
            Output::Svg => OutputFormat::Svg,
            Output::Png => OutputFormat::Png,
            Output::Html => OutputFormat::Html,
        },
        mount: args.mount.clone(),
        adjust_legend: args.adjust_legend,
    };

    let bytes = barchart::render_chart(&dataset, &config, &options).context("Failed to render chart")?;

    match &args.out {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&bytes).context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
