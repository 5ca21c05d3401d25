// CSV loading into a Dataset

use crate::data::Dataset;
use crate::error::{PlotError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Read CSV from any reader. The first record is the header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PlotError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "loaded csv");
    Dataset::new(headers, rows)
}

/// Read CSV from uploaded bytes.
pub fn read_csv_from_bytes(bytes: &[u8]) -> Result<Dataset> {
    read_csv(bytes)
}

/// Read CSV from a file on disk.
pub fn read_csv_from_path(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv(BufReader::new(file))
}
