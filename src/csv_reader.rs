// CSV input for chart datasets

use crate::data::{AxisKind, Dataset};
use crate::error::Result;
use std::io::Read;

/// Read a dataset from any CSV source. The header row declares the columns.
pub fn read_dataset<R: Read>(reader: R, x_kind: AxisKind) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Dataset::new(headers, x_kind, rows)
}

/// Read a dataset from CSV text.
pub fn read_dataset_from_str(text: &str, x_kind: AxisKind) -> Result<Dataset> {
    read_dataset(text.as_bytes(), x_kind)
}
