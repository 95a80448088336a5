use thiserror::Error;

/// Errors raised while building or rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart parent <{0}> does not exist")]
    MissingMountPoint(String),

    #[error("Overlay column '{0}' not found in dataset columns")]
    UnknownOverlayColumn(String),

    #[error("Dataset must contain at least one data row")]
    EmptyDataset,

    #[error("Dataset needs a group column and at least one series column (got {0} columns)")]
    TooFewColumns(usize),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Row {row} has no value for column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Failed to parse '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Invalid chart configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to render chart: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
