//! Per-trial parameter recovery.
//!
//! Given:
//! - concentrations `s_i`
//! - observed responses `y_i`
//! - a starting guess `(v_max, k_m)`
//!
//! we minimize `Σ (y_i - v_max s_i / (k_m + s_i))^2` with a Nelder–Mead
//! simplex and return whatever point the search ends on.
//!
//! The two parameters live on wildly different scales (`v_max ~ 1e5`,
//! `k_m ~ 1e-5`), so the search runs on coordinates divided by the initial
//! guess, and on the SSE divided by `Σ y_i^2`. Both rescalings leave the
//! minimizer unchanged. No bounds are applied: a noisy dataset may legitimately
//! pull `k_m` or `v_max` below zero.

use nalgebra::Vector2;

use crate::domain::{ConcentrationGrid, FitResult, InitialGuess, NoisyObservation};
use crate::error::AppError;
use crate::math::{SimplexOptions, minimize};
use crate::models::sum_squared_residuals;

/// Fitting options shared by every trial of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitOptions {
    pub simplex: SimplexOptions,
}

impl FitOptions {
    /// Override the per-trial iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.simplex.max_iterations = max_iterations;
        self
    }
}

/// Fit the rate law to one noisy dataset.
pub fn fit(
    grid: &ConcentrationGrid,
    observation: &NoisyObservation,
    guess: &InitialGuess,
    opts: &FitOptions,
) -> Result<FitResult, AppError> {
    if grid.is_empty() {
        return Err(AppError::invalid_design("No concentrations to fit."));
    }
    if grid.len() != observation.len() {
        return Err(AppError::invalid_design(format!(
            "Observation has {} values for {} concentrations.",
            observation.len(),
            grid.len()
        )));
    }
    guess.validate()?;
    let scale = Vector2::new(guess.max_velocity, guess.michaelis_constant);

    let s = grid.as_slice();
    let y = observation.as_slice();

    let energy: f64 = y.iter().map(|v| v * v).sum();
    let norm = if energy.is_finite() && energy > 0.0 { energy } else { 1.0 };

    let objective = |u: &Vector2<f64>| sum_squared_residuals(u[0] * scale[0], u[1] * scale[1], s, y) / norm;
    let outcome = minimize(objective, Vector2::new(1.0, 1.0), &opts.simplex);

    let max_velocity = outcome.point[0] * scale[0];
    let michaelis_constant = outcome.point[1] * scale[1];
    let sse = sum_squared_residuals(max_velocity, michaelis_constant, s, y);

    if !(max_velocity.is_finite() && michaelis_constant.is_finite() && sse.is_finite()) {
        return Err(AppError::fit_divergence(format!(
            "Optimizer ended on a non-finite result (v_max={max_velocity}, k_m={michaelis_constant}, sse={sse}) after {} iterations.",
            outcome.iterations
        )));
    }

    Ok(FitResult {
        max_velocity,
        michaelis_constant,
        sse,
        iterations: outcome.iterations,
        converged: outcome.converged,
    })
}
