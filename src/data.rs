use crate::error::{ChartError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Date format accepted for temporal group values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the first (group) column is positioned on the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    #[default]
    Categorical,
    Numeric,
    Temporal,
}

/// A parsed value of the group column.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupValue {
    Label(String),
    Number(f64),
    Date(NaiveDate),
}

impl GroupValue {
    fn parse(raw: &str, kind: AxisKind) -> std::result::Result<Self, String> {
        let raw = raw.trim();
        match kind {
            AxisKind::Categorical => Ok(GroupValue::Label(raw.to_string())),
            AxisKind::Numeric => raw
                .parse::<f64>()
                .map(GroupValue::Number)
                .map_err(|e| e.to_string()),
            AxisKind::Temporal => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(GroupValue::Date)
                .map_err(|e| e.to_string()),
        }
    }

    /// Text used for band-scale categories and axis labels.
    pub fn label(&self) -> String {
        match self {
            GroupValue::Label(s) => s.clone(),
            GroupValue::Number(n) => n.to_string(),
            GroupValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }

    /// Position on a continuous axis. Dates map to days from the common era.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupValue::Label(_) => None,
            GroupValue::Number(n) => Some(*n),
            GroupValue::Date(d) => Some(d.num_days_from_ce() as f64),
        }
    }
}

/// Tabular chart input: a group column followed by numeric series columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    x_kind: AxisKind,
    groups: Vec<GroupValue>,
    values: Vec<Vec<f64>>,
}

impl Dataset {
    /// Build a dataset from raw string cells, validating every row.
    pub fn new(columns: Vec<String>, x_kind: AxisKind, rows: Vec<Vec<String>>) -> Result<Self> {
        if columns.len() < 2 {
            return Err(ChartError::TooFewColumns(columns.len()));
        }
        if rows.is_empty() {
            return Err(ChartError::EmptyDataset);
        }
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(ChartError::DuplicateColumn(c.clone()));
            }
        }

        let mut groups = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let cell = |col_idx: usize| -> Result<&str> {
                match row.get(col_idx).map(|s| s.trim()) {
                    Some(s) if !s.is_empty() => Ok(s),
                    _ => Err(ChartError::MissingValue {
                        row: row_idx + 1,
                        column: columns[col_idx].clone(),
                    }),
                }
            };

            let raw_group = cell(0)?;
            let group = GroupValue::parse(raw_group, x_kind).map_err(|reason| {
                ChartError::InvalidValue {
                    row: row_idx + 1,
                    column: columns[0].clone(),
                    value: raw_group.to_string(),
                    reason,
                }
            })?;
            groups.push(group);

            let mut row_values = Vec::with_capacity(columns.len() - 1);
            for col_idx in 1..columns.len() {
                let raw = cell(col_idx)?;
                let v = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ChartError::InvalidValue {
                        row: row_idx + 1,
                        column: columns[col_idx].clone(),
                        value: raw.to_string(),
                        reason: "not a finite number".to_string(),
                    })?;
                row_values.push(v);
            }
            values.push(row_values);
        }

        Ok(Self {
            columns,
            x_kind,
            groups,
            values,
        })
    }

    /// Create a dataset from a JSON array of objects. Column order follows the
    /// key order of the first object.
    pub fn from_json(value: &Value, x_kind: AxisKind) -> Result<Self> {
        let invalid = |msg: &str| ChartError::InvalidValue {
            row: 0,
            column: String::new(),
            value: String::new(),
            reason: msg.to_string(),
        };
        let array = value
            .as_array()
            .ok_or_else(|| invalid("Input data must be a JSON array of objects"))?;

        let first_obj = match array.first() {
            Some(first) => first
                .as_object()
                .ok_or_else(|| invalid("Items in array must be objects"))?,
            None => return Err(ChartError::EmptyDataset),
        };
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for (row_idx, item) in array.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| invalid("Items in array must be objects"))?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => {
                        return Err(ChartError::InvalidValue {
                            row: row_idx + 1,
                            column: header.clone(),
                            value: other.to_string(),
                            reason: "unsupported value type".to_string(),
                        })
                    }
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Self::new(headers, x_kind, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the group (horizontal axis) column.
    pub fn group_column(&self) -> &str {
        &self.columns[0]
    }

    /// Names of all declared value columns, in declaration order.
    pub fn value_columns(&self) -> &[String] {
        &self.columns[1..]
    }

    pub fn x_kind(&self) -> AxisKind {
        self.x_kind
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[GroupValue] {
        &self.groups
    }

    /// All values of a series column, in row order.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.value_columns().iter().position(|c| c == name)?;
        Some(self.values.iter().map(|row| row[idx]).collect())
    }

    /// Value of `column` at `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.value_columns().iter().position(|c| c == column)?;
        self.values.get(row).map(|r| r[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_categorical() {
        let ds = Dataset::new(
            strings(&["month", "a", "b"]),
            AxisKind::Categorical,
            vec![strings(&["Jan", "10", "5"]), strings(&["Feb", "7", "8"])],
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.group_column(), "month");
        assert_eq!(ds.value_columns(), &["a", "b"]);
        assert_eq!(ds.series("b"), Some(vec![5.0, 8.0]));
        assert_eq!(ds.value(1, "a"), Some(7.0));
        assert_eq!(ds.groups()[0].label(), "Jan");
    }

    #[test]
    fn test_missing_value_rejected() {
        let err = Dataset::new(
            strings(&["month", "a", "b"]),
            AxisKind::Categorical,
            vec![strings(&["Jan", "10"])],
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::MissingValue { row: 1, .. }));
    }

    #[test]
    fn test_non_numeric_series_rejected() {
        let err = Dataset::new(
            strings(&["month", "a"]),
            AxisKind::Categorical,
            vec![strings(&["Jan", "lots"])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_temporal_group_values() {
        let ds = Dataset::new(
            strings(&["day", "v"]),
            AxisKind::Temporal,
            vec![strings(&["2024-01-01", "1"]), strings(&["2024-01-03", "2"])],
        )
        .unwrap();
        let a = ds.groups()[0].as_f64().unwrap();
        let b = ds.groups()[1].as_f64().unwrap();
        assert_eq!(b - a, 2.0);
        assert_eq!(ds.groups()[1].label(), "2024-01-03");
    }

    #[test]
    fn test_bad_date_rejected() {
        let res = Dataset::new(
            strings(&["day", "v"]),
            AxisKind::Temporal,
            vec![strings(&["01/02/2024", "1"])],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_duplicate_and_short_columns() {
        assert!(matches!(
            Dataset::new(strings(&["x"]), AxisKind::Numeric, vec![strings(&["1"])]),
            Err(ChartError::TooFewColumns(1))
        ));
        assert!(matches!(
            Dataset::new(strings(&["x", "a", "a"]), AxisKind::Numeric, vec![strings(&["1", "2", "3"])]),
            Err(ChartError::DuplicateColumn(_))
        ));
        assert!(matches!(
            Dataset::new(strings(&["x", "a"]), AxisKind::Numeric, vec![]),
            Err(ChartError::EmptyDataset)
        ));
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = json!([
            {"month": "Jan", "b": 5, "a": 10},
            {"month": "Feb", "b": 8, "a": 7}
        ]);
        let ds = Dataset::from_json(&value, AxisKind::Categorical).unwrap();
        assert_eq!(ds.columns(), &["month", "b", "a"]);
        assert_eq!(ds.series("a"), Some(vec![10.0, 7.0]));
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let value = json!({"month": "Jan"});
        assert!(Dataset::from_json(&value, AxisKind::Categorical).is_err());
        assert!(matches!(
            Dataset::from_json(&json!([]), AxisKind::Categorical),
            Err(ChartError::EmptyDataset)
        ));
    }

    #[test]
    fn test_from_json_null_is_missing() {
        let value = json!([{"month": "Jan", "a": null}]);
        let err = Dataset::from_json(&value, AxisKind::Categorical).unwrap_err();
        assert!(matches!(err, ChartError::MissingValue { .. }));
    }
}
