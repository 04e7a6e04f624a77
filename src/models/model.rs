//! Rate law evaluation.
//!
//! `v(s) = v_max * s / (k_m + s)`

use crate::domain::{ConcentrationGrid, ResponseCurve};

/// Reaction velocity at substrate concentration `s`.
///
/// No guard against `k_m + s == 0`: the fitter is unbounded and relies on the
/// resulting non-finite objective to steer away from the pole.
pub fn rate(max_velocity: f64, michaelis_constant: f64, s: f64) -> f64 {
    max_velocity * s / (michaelis_constant + s)
}

/// Noise-free response at every grid point.
pub fn noise_free_response(
    max_velocity: f64,
    michaelis_constant: f64,
    grid: &ConcentrationGrid,
) -> ResponseCurve {
    let values = grid
        .as_slice()
        .iter()
        .map(|&s| rate(max_velocity, michaelis_constant, s))
        .collect();
    ResponseCurve::from_values(values)
}

/// Sum of squared residuals of `observed` against the rate law.
pub fn sum_squared_residuals(
    max_velocity: f64,
    michaelis_constant: f64,
    concentrations: &[f64],
    observed: &[f64],
) -> f64 {
    concentrations
        .iter()
        .zip(observed.iter())
        .map(|(&s, &y)| {
            let r = y - rate(max_velocity, michaelis_constant, s);
            r * r
        })
        .sum()
}
