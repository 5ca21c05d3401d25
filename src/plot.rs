//! Plot selection: maps a plot kind and column choice to a rendering
//! operation, the effective y-axis label and the chart title.

use crate::data::Dataset;
use crate::error::{PlotError, Result};
use std::fmt;
use std::str::FromStr;

/// The supported chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    Line,
    Bar,
    Scatter,
    Distribution,
    Count,
}

impl PlotKind {
    pub const ALL: [PlotKind; 5] = [
        PlotKind::Line,
        PlotKind::Bar,
        PlotKind::Scatter,
        PlotKind::Distribution,
        PlotKind::Count,
    ];

    /// Label shown to the user and used in titles.
    pub fn display_name(self) -> &'static str {
        match self {
            PlotKind::Line => "Line Plot",
            PlotKind::Bar => "Bar Chart",
            PlotKind::Scatter => "Scatter Plot",
            PlotKind::Distribution => "Distribution Plot",
            PlotKind::Count => "Count Plot",
        }
    }

    /// Unary kinds only look at the x column.
    pub fn is_unary(self) -> bool {
        matches!(self, PlotKind::Distribution | PlotKind::Count)
    }

    /// Derived y label for kinds that plot a computed quantity.
    pub fn derived_y_label(self) -> Option<&'static str> {
        match self {
            PlotKind::Distribution => Some("Density"),
            PlotKind::Count => Some("Count"),
            PlotKind::Line | PlotKind::Bar | PlotKind::Scatter => None,
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlotKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "line" | "line plot" => Ok(PlotKind::Line),
            "bar" | "bar chart" => Ok(PlotKind::Bar),
            "scatter" | "scatter plot" => Ok(PlotKind::Scatter),
            "distribution" | "dist" | "hist" | "distribution plot" => Ok(PlotKind::Distribution),
            "count" | "count plot" => Ok(PlotKind::Count),
            _ => Err(PlotError::UnsupportedPlotKind(s.to_string())),
        }
    }
}

/// A user's column and chart choice for one render action.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub x_column: String,
    /// `None` when the y selector is left on its "None" option.
    pub y_column: Option<String>,
    pub kind: PlotKind,
}

impl PlotRequest {
    pub fn new(x_column: impl Into<String>, y_column: Option<String>, kind: PlotKind) -> Self {
        Self {
            x_column: x_column.into(),
            y_column,
            kind,
        }
    }
}

/// The drawing call chosen for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOperation {
    Line { x: String, y: String },
    Bar { x: String, y: String },
    Scatter { x: String, y: String },
    /// Histogram of `x` with a density estimate on top.
    Distribution { x: String },
    /// Frequency of each distinct value of `x`.
    Count { x: String },
}

/// Result of plot selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSelection {
    pub kind: PlotKind,
    pub operation: RenderOperation,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
}

/// Decide which rendering operation a request maps to.
///
/// Columns the kind consumes must exist in the dataset. Unary kinds ignore
/// the y column, and their y label is derived from the kind alone.
pub fn select_plot(dataset: &Dataset, request: &PlotRequest) -> Result<PlotSelection> {
    let x = require_column(dataset, &request.x_column)?;

    let (operation, y_label) = match request.kind {
        PlotKind::Line => {
            let y = require_y_column(dataset, request)?;
            (RenderOperation::Line { x, y: y.clone() }, y)
        }
        PlotKind::Bar => {
            let y = require_y_column(dataset, request)?;
            (RenderOperation::Bar { x, y: y.clone() }, y)
        }
        PlotKind::Scatter => {
            let y = require_y_column(dataset, request)?;
            (RenderOperation::Scatter { x, y: y.clone() }, y)
        }
        PlotKind::Distribution => (RenderOperation::Distribution { x }, "Density".to_string()),
        PlotKind::Count => (RenderOperation::Count { x }, "Count".to_string()),
    };

    let title = plot_title(request.kind, &y_label, &request.x_column);

    Ok(PlotSelection {
        kind: request.kind,
        operation,
        x_label: request.x_column.clone(),
        y_label,
        title,
    })
}

/// `"<kind> of <y label> vs <x column>"`
pub fn plot_title(kind: PlotKind, y_label: &str, x_column: &str) -> String {
    format!("{} of {} vs {}", kind, y_label, x_column)
}

fn require_y_column(dataset: &Dataset, request: &PlotRequest) -> Result<String> {
    let name = request
        .y_column
        .as_deref()
        .ok_or_else(|| PlotError::MissingYColumn {
            kind: request.kind.to_string(),
        })?;
    require_column(dataset, name)
}

fn require_column(dataset: &Dataset, name: &str) -> Result<String> {
    if dataset.has_column(name) {
        Ok(name.to_string())
    } else {
        Err(PlotError::invalid_column(name, dataset.columns()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dataset() -> Dataset {
        Dataset::new(
            vec!["age".to_string(), "income".to_string()],
            vec![
                vec!["31".to_string(), "52000".to_string()],
                vec!["45".to_string(), "61000".to_string()],
            ],
        )
        .unwrap()
    }

    fn request(kind: PlotKind, y: Option<&str>) -> PlotRequest {
        PlotRequest::new("age", y.map(|s| s.to_string()), kind)
    }

    #[test]
    fn test_scatter_selection() {
        let selection =
            select_plot(&make_dataset(), &request(PlotKind::Scatter, Some("income"))).unwrap();
        assert_eq!(
            selection.operation,
            RenderOperation::Scatter {
                x: "age".to_string(),
                y: "income".to_string()
            }
        );
        assert_eq!(selection.y_label, "income");
        assert_eq!(selection.title, "Scatter Plot of income vs age");
    }

    #[test]
    fn test_distribution_selection() {
        let selection =
            select_plot(&make_dataset(), &request(PlotKind::Distribution, None)).unwrap();
        assert_eq!(
            selection.operation,
            RenderOperation::Distribution {
                x: "age".to_string()
            }
        );
        assert_eq!(selection.title, "Distribution Plot of Density vs age");
    }

    #[test]
    fn test_binary_kinds_keep_y_column_label() {
        let data = make_dataset();
        for kind in [PlotKind::Line, PlotKind::Bar, PlotKind::Scatter] {
            let selection = select_plot(&data, &request(kind, Some("income"))).unwrap();
            assert_eq!(selection.y_label, "income");
            assert_eq!(selection.x_label, "age");
        }
    }

    #[test]
    fn test_unary_kinds_ignore_y_column() {
        let data = make_dataset();
        for y in [None, Some("income"), Some("age"), Some("salary")] {
            let dist = select_plot(&data, &request(PlotKind::Distribution, y)).unwrap();
            assert_eq!(dist.y_label, "Density");
            let count = select_plot(&data, &request(PlotKind::Count, y)).unwrap();
            assert_eq!(count.y_label, "Count");
            assert_eq!(
                count.operation,
                RenderOperation::Count {
                    x: "age".to_string()
                }
            );
        }
    }

    #[test]
    fn test_title_template_for_all_kinds() {
        let data = make_dataset();
        for kind in PlotKind::ALL {
            let selection = select_plot(&data, &request(kind, Some("income"))).unwrap();
            assert_eq!(
                selection.title,
                format!("{} of {} vs {}", kind.display_name(), selection.y_label, "age")
            );
        }
    }

    #[test]
    fn test_unary_kinds() {
        let unary: Vec<PlotKind> = PlotKind::ALL.into_iter().filter(|k| k.is_unary()).collect();
        assert_eq!(unary, vec![PlotKind::Distribution, PlotKind::Count]);
    }

    #[test]
    fn test_derived_y_label_matches_selection() {
        let data = make_dataset();
        for kind in PlotKind::ALL {
            let selection = select_plot(&data, &request(kind, Some("income"))).unwrap();
            let expected = kind.derived_y_label().unwrap_or("income");
            assert_eq!(selection.y_label, expected);
        }
    }

    #[test]
    fn test_invalid_y_column() {
        let result = select_plot(&make_dataset(), &request(PlotKind::Line, Some("salary")));
        match result {
            Err(PlotError::InvalidColumn { column, available }) => {
                assert_eq!(column, "salary");
                assert_eq!(available, vec!["age".to_string(), "income".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_x_column() {
        let req = PlotRequest::new("salary", None, PlotKind::Count);
        assert!(matches!(
            select_plot(&make_dataset(), &req),
            Err(PlotError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_binary_kind_without_y() {
        let result = select_plot(&make_dataset(), &request(PlotKind::Bar, None));
        assert!(matches!(result, Err(PlotError::MissingYColumn { .. })));
    }

    #[test]
    fn test_parse_plot_kind() {
        assert_eq!("Line Plot".parse::<PlotKind>().unwrap(), PlotKind::Line);
        assert_eq!("bar".parse::<PlotKind>().unwrap(), PlotKind::Bar);
        assert_eq!(" SCATTER ".parse::<PlotKind>().unwrap(), PlotKind::Scatter);
        assert_eq!("hist".parse::<PlotKind>().unwrap(), PlotKind::Distribution);
        assert_eq!("Count Plot".parse::<PlotKind>().unwrap(), PlotKind::Count);
        for kind in PlotKind::ALL {
            assert_eq!(kind.display_name().parse::<PlotKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_unsupported_kind() {
        assert!(matches!(
            "Pie Chart".parse::<PlotKind>(),
            Err(PlotError::UnsupportedPlotKind(name)) if name == "Pie Chart"
        ));
    }
}
