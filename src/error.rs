//! Error types for csvplot.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for csvplot operations.
pub type Result<T> = std::result::Result<T, PlotError>;

/// Errors raised while discovering, loading or plotting a dataset.
#[derive(Debug, Error)]
pub enum PlotError {
    /// The configured CSV directory does not exist.
    #[error("Folder not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    /// The configured CSV directory exists but could not be listed.
    #[error("Folder could not be read: {}: {source}", path.display())]
    UnreadableDirectory { path: PathBuf, source: io::Error },

    /// A selected column is not part of the dataset.
    #[error("Column '{column}' not found (available: {})", available.join(", "))]
    InvalidColumn {
        column: String,
        available: Vec<String>,
    },

    /// The plot kind is not one of the supported kinds.
    #[error("Unsupported plot kind: '{0}'")]
    UnsupportedPlotKind(String),

    /// A two-column plot was requested without a y column.
    #[error("{kind} requires a y column")]
    MissingYColumn { kind: String },

    /// A local file was selected that is not in the discovered list.
    #[error("File '{name}' is not one of the CSV files in {}", directory.display())]
    UnknownFile { name: String, directory: PathBuf },

    /// The CSV header names the same column twice.
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A data row has a different number of fields than the header.
    #[error("Row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// The CSV input has no header row.
    #[error("CSV input has no header row")]
    NoHeaders,

    /// A cell that must be numeric could not be parsed.
    #[error("Failed to parse '{value}' as number in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// Nothing left to plot after dropping missing values.
    #[error("Column '{0}' has no values to plot")]
    EmptyData(String),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Create an InvalidColumn error.
    pub fn invalid_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    /// Create a NonNumeric error. `row` is zero-based and reported one-based.
    pub fn non_numeric(column: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        Self::NonNumeric {
            column: column.into(),
            row: row + 1,
            value: value.into(),
        }
    }
}
