//! Concentration grid generation.
//!
//! The design places substrate concentrations on a base-2 geometric ladder
//! ending at the maximum concentration: each point is half the next one. This
//! puts most of the points around the saturation transition, where both
//! parameters are identifiable from a small number of concentrations.

use crate::domain::ConcentrationGrid;
use crate::error::AppError;

/// Build the `data_points_num` concentrations `max / 2^(n-1) ..= max`.
///
/// Points are computed as exact halvings of `max_concentration`, so the last
/// point equals it bit-for-bit and consecutive points differ by a factor of 2.
pub fn build_grid(max_concentration: f64, data_points_num: usize) -> Result<ConcentrationGrid, AppError> {
    if !(max_concentration.is_finite() && max_concentration > 0.0) {
        return Err(AppError::invalid_design(format!(
            "max_concentration must be finite and > 0 (got {max_concentration})."
        )));
    }
    if data_points_num < 2 {
        return Err(AppError::invalid_design(format!(
            "data_points_num must be >= 2 (got {data_points_num})."
        )));
    }

    let last = data_points_num - 1;
    let points: Vec<f64> = (0..data_points_num)
        .map(|i| halve(max_concentration, last - i))
        .collect();

    if points.iter().any(|c| !(c.is_finite() && *c > 0.0)) {
        return Err(AppError::invalid_design(format!(
            "max_concentration={max_concentration:e} is too small for {data_points_num} halvings."
        )));
    }

    Ok(ConcentrationGrid::from_points(points))
}

/// Generate `steps` base-2 log-spaced points between `min` and `max` (inclusive).
pub fn log2_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(AppError::invalid_design(format!(
            "Invalid log range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::invalid_design("Log range steps must be >= 2."));
    }

    let lg_min = min.log2();
    let lg_max = max.log2();
    let step = (lg_max - lg_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push((lg_min + step * i as f64).exp2());
    }
    // Pin the endpoint; exp2(log2(x)) does not round-trip exactly.
    out.push(max);
    Ok(out)
}

/// `value / 2^times` without going through `powi` for large exponents.
fn halve(value: f64, times: usize) -> f64 {
    let mut v = value;
    for _ in 0..times {
        v *= 0.5;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn grid_is_strictly_increasing_and_ends_at_max() {
        for &(max_c, n) in &[(1e-4, 13), (1e-3, 3), (1e-6, 100), (3.7e-5, 2)] {
            let grid = build_grid(max_c, n).unwrap();
            assert_eq!(grid.len(), n);
            assert_eq!(grid.max(), Some(max_c));
            for w in grid.as_slice().windows(2) {
                assert!(w[0] < w[1], "not increasing: {w:?}");
            }
        }
    }

    #[test]
    fn grid_first_point_is_derived_minimum() {
        let grid = build_grid(1e-4, 13).unwrap();
        let expected = 1e-4 / 2f64.powi(12);
        assert!((grid.as_slice()[0] - expected).abs() <= expected * 1e-15);
    }

    #[test]
    fn five_point_grid_matches_known_values() {
        let grid = build_grid(1e-4, 5).unwrap();
        let expected = [6.25e-6, 1.25e-5, 2.5e-5, 5e-5, 1e-4];
        for (a, b) in grid.as_slice().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-18, "{a} vs {b}");
        }
    }

    #[test]
    fn grid_rejects_invalid_inputs() {
        assert_eq!(build_grid(0.0, 5).unwrap_err().kind(), ErrorKind::InvalidDesign);
        assert_eq!(build_grid(-1e-4, 5).unwrap_err().kind(), ErrorKind::InvalidDesign);
        assert_eq!(build_grid(1e-4, 1).unwrap_err().kind(), ErrorKind::InvalidDesign);
        assert_eq!(build_grid(1e-4, 0).unwrap_err().kind(), ErrorKind::InvalidDesign);
    }

    #[test]
    fn log2_space_includes_endpoints() {
        let v = log2_space(0.01, 0.64, 7).unwrap();
        assert_eq!(v.len(), 7);
        assert!((v[0] - 0.01).abs() < 1e-15);
        assert_eq!(v[6], 0.64);
        assert!((v[1] - 0.02).abs() < 1e-12);
    }
}
