//! Sample statistics over estimate collections.
//!
//! Non-finite samples are kept by the engine (they are legitimate, if extreme,
//! estimates) but excluded here, so summaries stay finite.

/// Arithmetic mean of the finite samples.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Unbiased sample variance of the finite samples (needs at least two).
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let (ss, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + (v - m) * (v - m), n + 1));
    (n > 1).then(|| ss / (n as f64 - 1.0))
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Finite samples in ascending order.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Quantile `q ∈ [0, 1]` of ascending `sorted` data, linear interpolation
/// between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Empirical CDF of ascending `sorted` data: fraction of samples `<= x`.
pub fn ecdf_sorted(sorted: &[f64], x: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let count = sorted.partition_point(|&v| v <= x);
    count as f64 / sorted.len() as f64
}
