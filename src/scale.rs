use crate::config::{BarMode, ChartType};
use crate::data::{AxisKind, Dataset, GroupValue, DATE_FORMAT};
use crate::ir::{ResolvedConfig, ReshapedData};
use crate::transform::row_sums;
use chrono::NaiveDate;

/// Padding between and around bands on the categorical axis
pub const BAND_PADDING: f64 = 0.2;
/// Fraction added on top of the rounded vertical maximum
pub const HEADROOM: f64 = 0.1;
/// Tick count hint shared by both axes
pub const TICK_COUNT: usize = 10;

/// Continuous mapping from a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() { 0.5 } else { (v - d0) / span };
        r0 + t * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Categorical mapping: each label owns an equal-width band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    padding: f64,
    step: f64,
    start: f64,
}

impl BandScale {
    /// Labels are deduplicated, keeping first occurrence order.
    pub fn new(labels: &[String], range: (f64, f64), padding: f64) -> Self {
        let mut domain: Vec<String> = Vec::with_capacity(labels.len());
        for l in labels {
            if !domain.contains(l) {
                domain.push(l.clone());
            }
        }
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / f64::max(1.0, n - padding + 2.0 * padding);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self { domain, padding, step, start }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.step * (1.0 - self.padding)
    }

    /// Start of the band for `label`.
    pub fn apply(&self, label: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == label)
            .map(|i| self.start + self.step * i as f64)
    }
}

/// Horizontal scale chosen from the chart type and the group column kind.
#[derive(Debug, Clone, PartialEq)]
pub enum XScale {
    Band(BandScale),
    Linear(LinearScale),
    Time(LinearScale),
}

impl XScale {
    /// Left edge of the band, or the mapped value on a continuous axis.
    pub fn position(&self, value: &GroupValue) -> Option<f64> {
        match self {
            XScale::Band(b) => b.apply(&value.label()),
            XScale::Linear(s) | XScale::Time(s) => value.as_f64().map(|v| s.apply(v)),
        }
    }

    /// Middle of the band, or the mapped value on a continuous axis.
    pub fn center(&self, value: &GroupValue) -> Option<f64> {
        let bw = self.bandwidth();
        self.position(value).map(|x| x + bw / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        match self {
            XScale::Band(b) => b.bandwidth(),
            _ => 0.0,
        }
    }

    /// Tick positions with their labels.
    pub fn ticks(&self, format_integer: bool) -> Vec<(f64, String)> {
        match self {
            XScale::Band(b) => b
                .domain()
                .iter()
                .filter_map(|d| b.apply(d).map(|x| (x + b.bandwidth() / 2.0, d.clone())))
                .collect(),
            XScale::Linear(s) => {
                let values = s.ticks(TICK_COUNT);
                let step = tick_step(&values);
                values
                    .into_iter()
                    .map(|v| {
                        let label = if format_integer {
                            format!("{:.0}", v)
                        } else {
                            format_tick(v, step)
                        };
                        (s.apply(v), label)
                    })
                    .collect()
            }
            XScale::Time(s) => {
                let mut days: Vec<i64> = s.ticks(TICK_COUNT).iter().map(|v| v.round() as i64).collect();
                days.dedup();
                days.into_iter()
                    .filter_map(|d| {
                        let date = i32::try_from(d).ok().and_then(NaiveDate::from_num_days_from_ce_opt)?;
                        Some((s.apply(d as f64), date.format(DATE_FORMAT).to_string()))
                    })
                    .collect()
            }
        }
    }
}

/// Vertical domain `(y_min, y_max)` including thresholds, overlays and stacks,
/// with the fixed headroom applied.
pub fn y_domain(config: &ResolvedConfig, reshaped: &ReshapedData, data: &Dataset) -> (f64, f64) {
    let series_max = |v: &[f64]| v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let series_min = |v: &[f64]| v.iter().cloned().fold(f64::INFINITY, f64::min);

    let mut y_max = if config.threshold.is_empty() {
        reshaped
            .series_names
            .first()
            .and_then(|first| data.value(0, first))
            .unwrap_or(0.0)
    } else {
        config.threshold.iter().map(|t| t.value).fold(f64::NEG_INFINITY, f64::max)
    };
    if let Some(piston) = &reshaped.piston {
        y_max = y_max.max(series_max(piston));
    }
    if let Some(marker) = &reshaped.marker {
        y_max = y_max.max(series_max(marker));
    }

    let mut y_min = y_max;
    if config.style.barmode == Some(BarMode::Stacked) {
        y_max = row_sums(data, &reshaped.groups)
            .into_iter()
            .fold(y_max, f64::max);
        // With negative layers a partial stack can reach past its row sum
        let ends = reshaped
            .stacked
            .iter()
            .flatten()
            .flat_map(|series| series.intervals.iter().flatten().copied());
        for v in ends {
            y_max = y_max.max(v);
            y_min = y_min.min(v);
        }
    } else {
        for key in &reshaped.groups {
            if let Some(values) = data.series(key) {
                y_max = y_max.max(series_max(&values));
                y_min = y_min.min(series_min(&values));
            }
        }
    }

    let y_min = if y_min < 0.0 { y_min.floor() } else { 0.0 };
    let mut y_max = y_max.ceil() * (1.0 + HEADROOM);
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    (y_min, y_max)
}

pub fn build_y_scale(config: &ResolvedConfig, domain: (f64, f64)) -> LinearScale {
    LinearScale::new(domain, (config.style.canvas.height, 0.0))
}

/// Returns the scale and whether x tick labels use integer formatting.
pub fn build_x_scale(config: &ResolvedConfig, data: &Dataset) -> (XScale, bool) {
    let width = config.style.canvas.width;
    let band = || {
        let labels: Vec<String> = data.groups().iter().map(|g| g.label()).collect();
        XScale::Band(BandScale::new(&labels, (0.0, width), BAND_PADDING))
    };

    match (config.style.chart_type, data.x_kind()) {
        (ChartType::Bar, _) | (_, AxisKind::Categorical) => (band(), false),
        (_, kind) => {
            let values: Vec<f64> = data.groups().iter().filter_map(|g| g.as_f64()).collect();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let scale = LinearScale::new((min, max), (0.0, width));
            if kind == AxisKind::Temporal {
                (XScale::Time(scale), false)
            } else {
                (XScale::Linear(scale), true)
            }
        }
    }
}

/// Evenly spaced "nice" values covering `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(lo, hi, count as f64) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    let mut out: Vec<f64> = (i1..=i2)
        .map(|i| if inc < 0.0 { i as f64 / -inc } else { i as f64 * inc })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count;
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        (i1, i2, -inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Distance between the first two ticks, or 1 when there are fewer than two.
pub fn tick_step(values: &[f64]) -> f64 {
    match values {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    }
}

/// Format a tick value with just enough decimals for the tick step.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    let s = format!("{:.*}", decimals, value);
    if s == "-0" { "0".to_string() } else { s }
}
