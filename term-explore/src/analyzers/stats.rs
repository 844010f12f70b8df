//! Small numeric helpers shared by the analyzers.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance around `mean` with `ddof` delta degrees of freedom.
///
/// Returns `None` when there are not more values than `ddof`.
pub fn variance(values: &[f64], mean: f64, ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(sum_sq / (values.len() - ddof) as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    variance(values, m, 1).map(f64::sqrt)
}

/// Returns a sorted copy of `values`. NaN is never present in analyzer input.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile `q` of already sorted data, interpolating linearly between the
/// two closest ranks at position `(n - 1) * q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// First quartile, median, and third quartile of sorted data.
pub fn quartiles(sorted: &[f64]) -> Option<(f64, f64, f64)> {
    Some((
        quantile_sorted(sorted, 0.25)?,
        quantile_sorted(sorted, 0.5)?,
        quantile_sorted(sorted, 0.75)?,
    ))
}
