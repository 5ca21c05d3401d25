// Statistics behind the derived plot kinds and the summary table

use std::collections::{HashMap, HashSet};

/// Number of points on a density curve.
const KDE_GRID_POINTS: usize = 128;

/// One histogram bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    /// count / (n * width), so the bars integrate to 1.
    pub density: f64,
}

/// Sturges' rule: ceil(log2 n) + 1.
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Equal-width histogram over the data range.
pub fn histogram(data: &[f64], bin_count: usize) -> Vec<Bin> {
    if data.is_empty() || bin_count == 0 {
        return vec![];
    }

    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // A single distinct value gets one unit-wide bin centred on it
    let (start, width, bin_count) = if max == min {
        (min - 0.5, 1.0, 1)
    } else {
        (min, (max - min) / bin_count as f64, bin_count)
    };

    let mut counts = vec![0usize; bin_count];
    for &v in data {
        let idx = ((v - start) / width).floor() as usize;
        // The maximum lands on the right edge of the last bin
        counts[idx.min(bin_count - 1)] += 1;
    }

    let n = data.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: start + i as f64 * width,
            end: start + (i + 1) as f64 * width,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}

/// Silverman's rule of thumb for bandwidth selection
pub fn silverman_bandwidth(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if n < 2.0 { return 1.0; }

    let std_dev = sample_std(data).unwrap_or(0.0);

    // IQR-based estimate for robustness
    let sorted = sorted_copy(data);
    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;

    // h = 0.9 * min(std, IQR/1.34) * n^(-1/5)
    let scale = if iqr > 0.0 { std_dev.min(iqr / 1.34) } else { std_dev };
    if scale <= 0.0 { return 1.0; }
    0.9 * scale * n.powf(-0.2)
}

/// Gaussian kernel function
fn gaussian_kernel(u: f64) -> f64 {
    const SQRT_2PI: f64 = 2.5066282746310002;
    (-0.5 * u * u).exp() / SQRT_2PI
}

/// Gaussian KDE evaluated on an evenly spaced grid.
///
/// Returns `(grid, density)`; densities are in data units, not rescaled.
pub fn kde(data: &[f64], bandwidth: f64) -> (Vec<f64>, Vec<f64>) {
    let n = data.len() as f64;
    if n == 0.0 || bandwidth <= 0.0 { return (vec![], vec![]); }

    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Extend range slightly for smooth edges
    let extend = 3.0 * bandwidth;
    let start = min - extend;
    let step = (max + extend - start) / (KDE_GRID_POINTS - 1) as f64;

    let mut grid = Vec::with_capacity(KDE_GRID_POINTS);
    let mut density = Vec::with_capacity(KDE_GRID_POINTS);

    for i in 0..KDE_GRID_POINTS {
        let x = start + i as f64 * step;
        let d: f64 = data
            .iter()
            .map(|&xi| gaussian_kernel((x - xi) / bandwidth))
            .sum();
        grid.push(x);
        density.push(d / (n * bandwidth));
    }

    (grid, density)
}

/// Linear-interpolated percentile of already sorted data, `p` in [0, 1].
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 { return 0.0; }
    if n == 1 { return sorted_data[0]; }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub fn sample_std(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let mean = mean(data)?;
    let variance =
        data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Some(variance.sqrt())
}

pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Order categories: numerically when every label is a number,
/// otherwise by first appearance.
pub fn order_categories<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<&'a str> = HashSet::new();
    for value in values {
        if seen.insert(value) {
            order.push(value.to_string());
        }
    }

    let numeric: Option<Vec<f64>> = order.iter().map(|s| crate::data::parse_number(s)).collect();
    if let Some(keys) = numeric {
        let mut paired: Vec<(f64, String)> = keys.into_iter().zip(order).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));
        paired.into_iter().map(|(_, label)| label).collect()
    } else {
        order
    }
}

/// Frequency of each category, in `order_categories` order.
pub fn count_values<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for value in values.clone() {
        *counts.entry(value).or_default() += 1;
    }
    order_categories(values)
        .into_iter()
        .map(|label| {
            let count = counts.get(label.as_str()).copied().unwrap_or(0);
            (label, count)
        })
        .collect()
}

/// Mean of `y` for each key, in `order_categories` order of the keys.
pub fn mean_by_category<'a, I>(pairs: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)> + Clone,
{
    let mut sums: HashMap<&'a str, (f64, usize)> = HashMap::new();
    for (key, y) in pairs.clone() {
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += y;
        entry.1 += 1;
    }
    order_categories(pairs.into_iter().map(|(key, _)| key))
        .into_iter()
        .map(|label| {
            let (sum, n) = sums.get(label.as_str()).copied().unwrap_or((0.0, 1));
            (label, sum / n as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sturges_bins() {
        assert_eq!(sturges_bins(0), 1);
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(100), 8);
    }

    #[test]
    fn test_histogram_counts_and_density() {
        let data = [1.0, 2.0, 2.0, 3.0, 4.0];
        let bins = histogram(&data, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        // Max value falls into the last bin
        assert_eq!(bins[2].count, 2);

        let area: f64 = bins.iter().map(|b| b.density * (b.end - b.start)).sum();
        assert!(approx(area, 1.0));
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[5.0, 5.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert!(approx(bins[0].start, 4.5));
        assert!(approx(bins[0].density, 1.0));
    }

    #[test]
    fn test_kde_integrates_to_about_one() {
        let data = [1.0, 2.0, 2.5, 3.0, 7.0];
        let bandwidth = silverman_bandwidth(&data);
        let (grid, density) = kde(&data, bandwidth);
        assert_eq!(grid.len(), KDE_GRID_POINTS);
        let step = grid[1] - grid[0];
        let area: f64 = density.iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 0.02, "area was {}", area);
    }

    #[test]
    fn test_silverman_degenerate() {
        assert_eq!(silverman_bandwidth(&[3.0]), 1.0);
        assert_eq!(silverman_bandwidth(&[3.0, 3.0, 3.0]), 1.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(percentile(&sorted, 0.25), 1.75));
        assert!(approx(percentile(&sorted, 0.5), 2.5));
        assert!(approx(percentile(&sorted, 1.0), 4.0));
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[1.0]), None);
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(approx(std, 2.138089935299395));
    }

    #[test]
    fn test_order_categories_text_keeps_appearance() {
        let order = order_categories(["b", "a", "b", "c"]);
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_order_categories_numeric_sorted() {
        let order = order_categories(["10", "2", "10", "1.5"]);
        assert_eq!(order, vec!["1.5", "2", "10"]);
    }

    #[test]
    fn test_count_values() {
        let counts = count_values(vec!["x", "y", "x", "x"]);
        assert_eq!(counts, vec![("x".to_string(), 3), ("y".to_string(), 1)]);
    }

    #[test]
    fn test_mean_by_category() {
        let means = mean_by_category(vec![("a", 1.0), ("b", 4.0), ("a", 3.0)]);
        assert_eq!(means, vec![("a".to_string(), 2.0), ("b".to_string(), 4.0)]);
    }
}
