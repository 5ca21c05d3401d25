use crate::error::{PlotError, Result};
use std::collections::HashSet;

/// Cell values treated as missing, in addition to the empty string.
const MISSING_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Tabular data loaded from one CSV source.
///
/// Cells are kept as text and interpreted as numbers on demand, so the same
/// column can act as a numeric axis or as categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate column names and ragged rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(PlotError::DuplicateColumn(header.clone()));
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(PlotError::RaggedRow {
                row: idx + 1,
                found: row.len(),
                expected: headers.len(),
            });
        }

        Ok(Self { headers, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PlotError::invalid_column(name, &self.headers))
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Raw cells of a column, `None` for missing values.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                let cell = row[idx].as_str();
                if is_missing(cell) {
                    None
                } else {
                    Some(cell)
                }
            })
            .collect())
    }

    /// Cells of a column parsed as numbers, `None` for missing values.
    ///
    /// Fails on the first present cell that is not a number.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.text_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(text) => parse_number(text)
                    .map(Some)
                    .ok_or_else(|| PlotError::non_numeric(name, row, text)),
            })
            .collect()
    }

    /// True when the column has at least one value and every value is numeric.
    pub fn is_numeric(&self, name: &str) -> bool {
        match self.text_column(name) {
            Ok(cells) => {
                let mut present = cells.into_iter().flatten().peekable();
                present.peek().is_some() && present.all(|c| parse_number(c).is_some())
            }
            Err(_) => false,
        }
    }
}

pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
