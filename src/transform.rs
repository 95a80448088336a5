use crate::config::BarMode;
use crate::data::Dataset;
use crate::error::{ChartError, Result};
use crate::ir::{ResolvedConfig, ReshapedData, StackSeries};

/// Split the dataset into primary series and overlays, then stack if asked.
///
/// The piston is extracted before the marker. Each extracted column leaves
/// the working column list so it is never drawn as a primary series.
pub fn reshape(config: &ResolvedConfig, data: &Dataset) -> Result<ReshapedData> {
    let mut groups: Vec<String> = data.value_columns().to_vec();

    let piston = match &config.piston {
        Some(overlay) => Some(extract(&mut groups, data, &overlay.name)?),
        None => None,
    };
    let marker = match &config.marker {
        Some(overlay) => Some(extract(&mut groups, data, &overlay.name)?),
        None => None,
    };

    let stacked = if config.style.barmode == Some(BarMode::Stacked) {
        Some(stack(data, &groups))
    } else {
        None
    };

    log::debug!(
        "reshaped {} rows: groups={:?}, piston={}, marker={}",
        data.len(),
        groups,
        piston.is_some(),
        marker.is_some()
    );

    Ok(ReshapedData {
        group_name: data.group_column().to_string(),
        series_names: data.value_columns().to_vec(),
        groups,
        stacked,
        piston,
        marker,
    })
}

fn extract(groups: &mut Vec<String>, data: &Dataset, name: &str) -> Result<Vec<f64>> {
    let idx = groups
        .iter()
        .position(|g| g == name)
        .ok_or_else(|| ChartError::UnknownOverlayColumn(name.to_string()))?;
    groups.remove(idx);
    data.series(name)
        .ok_or_else(|| ChartError::UnknownOverlayColumn(name.to_string()))
}

/// Cumulative `[start, end]` intervals per key, in key order, aligned to rows.
pub fn stack(data: &Dataset, keys: &[String]) -> Vec<StackSeries> {
    let mut offsets = vec![0.0_f64; data.len()];
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let values = data.series(key).unwrap_or_else(|| vec![0.0; data.len()]);
        let intervals = values
            .iter()
            .zip(offsets.iter_mut())
            .map(|(&v, offset)| {
                let start = *offset;
                *offset += v;
                [start, *offset]
            })
            .collect();
        out.push(StackSeries {
            key: key.clone(),
            intervals,
        });
    }
    out
}

/// Sum of the primary series for each row.
pub fn row_sums(data: &Dataset, keys: &[String]) -> Vec<f64> {
    (0..data.len())
        .map(|row| keys.iter().filter_map(|k| data.value(row, k)).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::data::AxisKind;
    use crate::resolve::normalize;

    fn dataset() -> Dataset {
        let s = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Dataset::new(
            s(&["month", "a", "b", "cap", "goal"]),
            AxisKind::Categorical,
            vec![
                s(&["Jan", "10", "5", "20", "12"]),
                s(&["Feb", "7", "8", "18", "14"]),
                s(&["Mar", "3", "-2", "9", "4"]),
            ],
        )
        .unwrap()
    }

    fn config(json: &str) -> ResolvedConfig {
        normalize(&ChartConfig::from_json_str(json).unwrap())
    }

    #[test]
    fn test_overlays_removed_from_groups() {
        let r = reshape(
            &config(r#"{"piston": {"name": "cap"}, "marker": {"name": "goal"}}"#),
            &dataset(),
        )
        .unwrap();
        assert_eq!(r.group_name, "month");
        assert_eq!(r.groups, vec!["a", "b"]);
        assert_eq!(r.series_names, vec!["a", "b", "cap", "goal"]);
        assert_eq!(r.piston, Some(vec![20.0, 18.0, 9.0]));
        assert_eq!(r.marker, Some(vec![12.0, 14.0, 4.0]));
        let stacked = r.stacked.unwrap();
        assert_eq!(stacked.len(), 2);
        assert_eq!(stacked[0].key, "a");
        assert_eq!(stacked[1].intervals[0], [10.0, 15.0]);
    }

    #[test]
    fn test_unknown_overlay_is_reported() {
        let err = reshape(&config(r#"{"marker": {"name": "nope"}}"#), &dataset()).unwrap_err();
        assert!(matches!(err, ChartError::UnknownOverlayColumn(ref n) if n == "nope"));
    }

    #[test]
    fn test_same_column_for_piston_and_marker_fails() {
        let err = reshape(
            &config(r#"{"piston": {"name": "cap"}, "marker": {"name": "cap"}}"#),
            &dataset(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::UnknownOverlayColumn(_)));
    }

    #[test]
    fn test_grouped_has_no_stack() {
        let r = reshape(&config(r#"{"style": {"barmode": "grouped"}}"#), &dataset()).unwrap();
        assert!(r.stacked.is_none());
        assert_eq!(r.groups.len(), 4);
    }

    #[test]
    fn test_stack_heights_sum_to_row_sums() {
        let ds = dataset();
        let keys = vec!["a".to_string(), "b".to_string(), "cap".to_string()];
        let stacked = stack(&ds, &keys);
        let sums = row_sums(&ds, &keys);
        for (row, sum) in sums.iter().enumerate() {
            let total: f64 = stacked.iter().map(|s| s.intervals[row][1] - s.intervals[row][0]).sum();
            assert!((total - sum).abs() < 1e-9);
        }
        // negative values stack downward from the running offset
        assert_eq!(stacked[1].intervals[2], [3.0, 1.0]);
    }
}
