// Figure building: turn a plot selection into drawable geometry

use crate::data::Dataset;
use crate::error::{PlotError, Result};
use crate::plot::{PlotSelection, RenderOperation};
use crate::stats;
use std::ops::Range;

/// How the x axis maps values to positions.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    Numeric,
    /// Category `i` is centred on x = i.
    Categorical(Vec<String>),
}

/// One bar, spanning `left..right` horizontally and `0..height` vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Line(Vec<(f64, f64)>),
    Points(Vec<(f64, f64)>),
    Bars(Vec<Bar>),
    /// Smooth overlay curve, drawn on top of bars.
    Curve(Vec<(f64, f64)>),
}

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub marks: Vec<Mark>,
}

/// Width of a bar relative to the category spacing.
const BAR_WIDTH: f64 = 0.8;

/// Compute the geometry of a selected plot.
///
/// `bins` overrides the histogram bin count for distribution plots.
pub fn build_figure(
    dataset: &Dataset,
    selection: &PlotSelection,
    bins: Option<usize>,
) -> Result<Figure> {
    let (x_axis, marks) = match &selection.operation {
        RenderOperation::Line { x, y } => line_marks(dataset, x, y)?,
        RenderOperation::Scatter { x, y } => scatter_marks(dataset, x, y)?,
        RenderOperation::Bar { x, y } => bar_marks(dataset, x, y)?,
        RenderOperation::Distribution { x } => distribution_marks(dataset, x, bins)?,
        RenderOperation::Count { x } => count_marks(dataset, x)?,
    };

    let includes_zero = marks.iter().any(|m| matches!(m, Mark::Bars(_)));
    let (x_range, y_range) = compute_ranges(&x_axis, &marks, includes_zero);

    Ok(Figure {
        title: selection.title.clone(),
        x_label: selection.x_label.clone(),
        y_label: selection.y_label.clone(),
        x_axis,
        x_range,
        y_range,
        marks,
    })
}

/// Rows where both x and y are present, with y parsed as a number.
fn paired_rows<'a>(dataset: &'a Dataset, x: &str, y: &str) -> Result<Vec<(&'a str, f64)>> {
    let xs = dataset.text_column(x)?;
    let ys = dataset.numeric_column(y)?;
    let pairs: Vec<(&str, f64)> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect();

    if pairs.is_empty() {
        return Err(PlotError::EmptyData(y.to_string()));
    }
    Ok(pairs)
}

/// Map x cells to positions: numbers stay numbers, text becomes category indices.
fn position_x(pairs: &[(&str, f64)]) -> (XAxis, Vec<(f64, f64)>) {
    let numeric: Option<Vec<f64>> = pairs
        .iter()
        .map(|(x, _)| crate::data::parse_number(x))
        .collect();

    match numeric {
        Some(xs) => {
            let points = xs.into_iter().zip(pairs.iter().map(|(_, y)| *y)).collect();
            (XAxis::Numeric, points)
        }
        None => {
            let categories = stats::order_categories(pairs.iter().map(|(x, _)| *x));
            let points = pairs
                .iter()
                .map(|(x, y)| (category_index(&categories, x), *y))
                .collect();
            (XAxis::Categorical(categories), points)
        }
    }
}

fn category_index(categories: &[String], label: &str) -> f64 {
    categories.iter().position(|c| c == label).unwrap_or(0) as f64
}

fn line_marks(dataset: &Dataset, x: &str, y: &str) -> Result<(XAxis, Vec<Mark>)> {
    let pairs = paired_rows(dataset, x, y)?;
    let (x_axis, points) = position_x(&pairs);

    // Repeated x values collapse to their mean y
    let mut sorted = points;
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut line: Vec<(f64, f64, usize)> = Vec::new();
    for (px, py) in sorted {
        match line.last_mut() {
            Some(last) if last.0 == px => {
                last.1 += py;
                last.2 += 1;
            }
            _ => line.push((px, py, 1)),
        }
    }
    let line = line
        .into_iter()
        .map(|(px, sum, n)| (px, sum / n as f64))
        .collect();

    Ok((x_axis, vec![Mark::Line(line)]))
}

fn scatter_marks(dataset: &Dataset, x: &str, y: &str) -> Result<(XAxis, Vec<Mark>)> {
    let pairs = paired_rows(dataset, x, y)?;
    let (x_axis, points) = position_x(&pairs);
    Ok((x_axis, vec![Mark::Points(points)]))
}

fn bar_marks(dataset: &Dataset, x: &str, y: &str) -> Result<(XAxis, Vec<Mark>)> {
    let pairs = paired_rows(dataset, x, y)?;
    let means = stats::mean_by_category(pairs.iter().copied());
    let (categories, heights): (Vec<String>, Vec<f64>) = means.into_iter().unzip();
    Ok((
        XAxis::Categorical(categories),
        vec![Mark::Bars(category_bars(&heights))],
    ))
}

fn count_marks(dataset: &Dataset, x: &str) -> Result<(XAxis, Vec<Mark>)> {
    let values: Vec<&str> = dataset.text_column(x)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(PlotError::EmptyData(x.to_string()));
    }

    let counts = stats::count_values(values.iter().copied());
    let (categories, heights): (Vec<String>, Vec<f64>) = counts
        .into_iter()
        .map(|(label, count)| (label, count as f64))
        .unzip();
    Ok((
        XAxis::Categorical(categories),
        vec![Mark::Bars(category_bars(&heights))],
    ))
}

fn distribution_marks(
    dataset: &Dataset,
    x: &str,
    bins: Option<usize>,
) -> Result<(XAxis, Vec<Mark>)> {
    let values: Vec<f64> = dataset.numeric_column(x)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(PlotError::EmptyData(x.to_string()));
    }

    let bin_count = bins
        .filter(|&b| b > 0)
        .unwrap_or_else(|| stats::sturges_bins(values.len()));
    let bars = stats::histogram(&values, bin_count)
        .into_iter()
        .map(|bin| Bar {
            left: bin.start,
            right: bin.end,
            height: bin.density,
        })
        .collect();

    let mut marks = vec![Mark::Bars(bars)];

    // A density curve needs some spread to be meaningful
    if values.len() > 1 {
        let bandwidth = stats::silverman_bandwidth(&values);
        let (grid, density) = stats::kde(&values, bandwidth);
        marks.push(Mark::Curve(grid.into_iter().zip(density).collect()));
    }

    Ok((XAxis::Numeric, marks))
}

fn category_bars(heights: &[f64]) -> Vec<Bar> {
    heights
        .iter()
        .enumerate()
        .map(|(idx, &height)| Bar {
            left: idx as f64 - BAR_WIDTH / 2.0,
            right: idx as f64 + BAR_WIDTH / 2.0,
            height,
        })
        .collect()
}

/// Axis ranges covering every mark, padded by 5%.
fn compute_ranges(x_axis: &XAxis, marks: &[Mark], includes_zero: bool) -> (Range<f64>, Range<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for mark in marks {
        match mark {
            Mark::Line(points) | Mark::Points(points) | Mark::Curve(points) => {
                xs.extend(points.iter().map(|p| p.0));
                ys.extend(points.iter().map(|p| p.1));
            }
            Mark::Bars(bars) => {
                for bar in bars {
                    xs.push(bar.left);
                    xs.push(bar.right);
                    ys.push(bar.height);
                }
            }
        }
    }
    if includes_zero {
        ys.push(0.0);
    }

    let x_range = match x_axis {
        XAxis::Categorical(categories) => -0.5..(categories.len() as f64 - 0.5),
        XAxis::Numeric => padded_range(&xs),
    };
    let mut y_range = padded_range(&ys);
    // Bars sit on the axis rather than floating above padding
    if includes_zero && ys.iter().all(|&y| y >= 0.0) {
        y_range.start = 0.0;
    }

    (x_range, y_range)
}

fn padded_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{select_plot, PlotKind, PlotRequest};

    fn make_data(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Dataset {
        Dataset::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.into_iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn figure_for(data: &Dataset, x: &str, y: Option<&str>, kind: PlotKind) -> Result<Figure> {
        let request = PlotRequest::new(x, y.map(|s| s.to_string()), kind);
        let selection = select_plot(data, &request)?;
        build_figure(data, &selection, None)
    }

    #[test]
    fn test_line_averages_repeated_x_and_sorts() {
        let data = make_data(
            vec!["x", "y"],
            vec![vec!["3", "30"], vec!["1", "10"], vec!["1", "20"], vec!["2", ""]],
        );
        let figure = figure_for(&data, "x", Some("y"), PlotKind::Line).unwrap();
        assert_eq!(figure.x_axis, XAxis::Numeric);
        assert_eq!(figure.marks, vec![Mark::Line(vec![(1.0, 15.0), (3.0, 30.0)])]);
        assert_eq!(figure.y_label, "y");
        assert_eq!(figure.title, "Line Plot of y vs x");
    }

    #[test]
    fn test_scatter_with_text_x_uses_categories() {
        let data = make_data(
            vec!["city", "income"],
            vec![vec!["Oslo", "5"], vec!["Lima", "7"], vec!["Oslo", "6"]],
        );
        let figure = figure_for(&data, "city", Some("income"), PlotKind::Scatter).unwrap();
        assert_eq!(
            figure.x_axis,
            XAxis::Categorical(vec!["Oslo".to_string(), "Lima".to_string()])
        );
        assert_eq!(
            figure.marks,
            vec![Mark::Points(vec![(0.0, 5.0), (1.0, 7.0), (0.0, 6.0)])]
        );
        assert_eq!(figure.x_range, -0.5..1.5);
    }

    #[test]
    fn test_bar_uses_category_means() {
        let data = make_data(
            vec!["region", "sales"],
            vec![vec!["north", "10"], vec!["south", "4"], vec!["north", "20"]],
        );
        let figure = figure_for(&data, "region", Some("sales"), PlotKind::Bar).unwrap();
        match &figure.marks[0] {
            Mark::Bars(bars) => {
                let heights: Vec<f64> = bars.iter().map(|b| b.height).collect();
                assert_eq!(heights, vec![15.0, 4.0]);
            }
            other => panic!("unexpected mark: {:?}", other),
        }
        assert_eq!(figure.y_range.start, 0.0);
    }

    #[test]
    fn test_count_ignores_y_and_missing() {
        let data = make_data(
            vec!["color", "n"],
            vec![vec!["red", "1"], vec!["blue", "x"], vec!["red", "2"], vec!["", "3"]],
        );
        let figure = figure_for(&data, "color", Some("n"), PlotKind::Count).unwrap();
        assert_eq!(figure.y_label, "Count");
        assert_eq!(
            figure.x_axis,
            XAxis::Categorical(vec!["red".to_string(), "blue".to_string()])
        );
        match &figure.marks[0] {
            Mark::Bars(bars) => {
                let total: f64 = bars.iter().map(|b| b.height).sum();
                assert_eq!(total, 3.0);
            }
            other => panic!("unexpected mark: {:?}", other),
        }
    }

    #[test]
    fn test_distribution_has_histogram_and_curve() {
        let data = make_data(
            vec!["age"],
            vec![vec!["21"], vec!["25"], vec!["25"], vec!["33"], vec!["40"], vec!["58"]],
        );
        let figure = figure_for(&data, "age", None, PlotKind::Distribution).unwrap();
        assert_eq!(figure.y_label, "Density");
        assert_eq!(figure.marks.len(), 2);
        match &figure.marks[0] {
            Mark::Bars(bars) => {
                assert_eq!(bars.len(), stats::sturges_bins(6));
                let area: f64 = bars.iter().map(|b| b.height * (b.right - b.left)).sum();
                assert!((area - 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected mark: {:?}", other),
        }
        assert!(matches!(figure.marks[1], Mark::Curve(_)));
    }

    #[test]
    fn test_distribution_bin_override() {
        let data = make_data(vec!["v"], vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"]]);
        let request = PlotRequest::new("v", None, PlotKind::Distribution);
        let selection = select_plot(&data, &request).unwrap();
        let figure = build_figure(&data, &selection, Some(2)).unwrap();
        match &figure.marks[0] {
            Mark::Bars(bars) => assert_eq!(bars.len(), 2),
            other => panic!("unexpected mark: {:?}", other),
        }
    }

    #[test]
    fn test_distribution_requires_numeric() {
        let data = make_data(vec!["city"], vec![vec!["Oslo"], vec!["Lima"]]);
        let result = figure_for(&data, "city", None, PlotKind::Distribution);
        assert!(matches!(result, Err(PlotError::NonNumeric { .. })));
    }

    #[test]
    fn test_non_numeric_y_rejected() {
        let data = make_data(vec!["x", "y"], vec![vec!["1", "abc"]]);
        let result = figure_for(&data, "x", Some("y"), PlotKind::Line);
        assert!(matches!(result, Err(PlotError::NonNumeric { .. })));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let data = make_data(vec!["x", "y"], vec![]);
        let result = figure_for(&data, "x", Some("y"), PlotKind::Scatter);
        assert!(matches!(result, Err(PlotError::EmptyData(_))));
        let result = figure_for(&data, "x", None, PlotKind::Count);
        assert!(matches!(result, Err(PlotError::EmptyData(_))));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[5.0, 5.0]), 4.0..6.0);
        assert_eq!(padded_range(&[0.0, 10.0]), -0.5..10.5);
        assert_eq!(padded_range(&[]), 0.0..1.0);
    }
}
