//! Data preview and descriptive statistics.

use crate::data::Dataset;
use crate::stats;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent for a single value.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// The first rows of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Preview<'a> {
    pub columns: &'a [String],
    pub rows: &'a [Vec<String>],
}

pub fn preview(dataset: &Dataset, rows: usize) -> Preview<'_> {
    Preview {
        columns: dataset.columns(),
        rows: dataset.head(rows),
    }
}

/// Summaries for every numeric column, in column order.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .columns()
        .iter()
        .filter(|name| dataset.is_numeric(name))
        .filter_map(|name| {
            let column = dataset.numeric_column(name).ok()?;
            let values: Vec<f64> = column.into_iter().flatten().collect();
            summarize(name, &values)
        })
        .collect()
}

fn summarize(column: &str, values: &[f64]) -> Option<ColumnSummary> {
    let mean = stats::mean(values)?;
    let sorted = stats::sorted_copy(values);
    Some(ColumnSummary {
        column: column.to_string(),
        count: sorted.len(),
        mean,
        std: stats::sample_std(values),
        min: sorted[0],
        q25: stats::percentile(&sorted, 0.25),
        q50: stats::percentile(&sorted, 0.5),
        q75: stats::percentile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Render a preview as an aligned text table with a row index column.
pub fn preview_table(preview: &Preview<'_>) -> String {
    let mut headers = vec![String::new()];
    headers.extend(preview.columns.iter().cloned());

    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![idx.to_string()];
            cells.extend(row.iter().cloned());
            cells
        })
        .collect();

    format_table(&headers, &rows)
}

/// Render summaries with one row per statistic and one column per data column.
pub fn describe_table(summaries: &[ColumnSummary]) -> String {
    let mut headers = vec![String::new()];
    headers.extend(summaries.iter().map(|s| s.column.clone()));

    let stat_rows: [(&str, fn(&ColumnSummary) -> String); 8] = [
        ("count", |s| format_number(s.count as f64)),
        ("mean", |s| format_number(s.mean)),
        ("std", |s| s.std.map(format_number).unwrap_or_else(|| "NaN".to_string())),
        ("min", |s| format_number(s.min)),
        ("25%", |s| format_number(s.q25)),
        ("50%", |s| format_number(s.q50)),
        ("75%", |s| format_number(s.q75)),
        ("max", |s| format_number(s.max)),
    ];

    let rows: Vec<Vec<String>> = stat_rows
        .iter()
        .map(|(label, value)| {
            let mut cells = vec![label.to_string()];
            cells.extend(summaries.iter().map(value));
            cells
        })
        .collect();

    format_table(&headers, &rows)
}

fn format_number(value: f64) -> String {
    format!("{:.6}", value)
}

/// Right-aligned columns separated by two spaces, sized by display width.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let mut out = String::new();
    for line in std::iter::once(headers).chain(rows.iter().map(|r| r.as_slice())) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| {
                let pad = width.saturating_sub(cell.width());
                format!("{}{}", " ".repeat(pad), cell)
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
