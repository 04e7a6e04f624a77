//! Shared domain types.
//!
//! These types are intentionally kept lightweight. The design and the estimate
//! collections are serializable so they can be:
//!
//! - loaded from a JSON design file
//! - exported alongside results
//! - reloaded later for plotting

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Reference default for the true maximum velocity.
pub const DEFAULT_MAX_VELOCITY: f64 = 242e3;
/// Reference default for the true Michaelis constant.
pub const DEFAULT_MICHAELIS_CONSTANT: f64 = 42e-6;
/// Reference default for the highest substrate concentration.
pub const DEFAULT_MAX_CONCENTRATION: f64 = 1e-4;
pub const DEFAULT_DATA_POINTS: usize = 13;
pub const DEFAULT_REPETITIONS: usize = 3;
pub const DEFAULT_RELATIVE_ERROR: f64 = 0.15;
pub const DEFAULT_SIMULATIONS: usize = 1000;

/// Inclusive ranges accepted from the parameter source (CLI, design file).
///
/// These are narrower than what the engine can technically handle; the engine
/// itself only rejects inputs that make the computation meaningless.
pub mod source_ranges {
    pub const MICHAELIS_CONSTANT: (f64, f64) = (1e-9, 1.0);
    pub const MAX_VELOCITY: (f64, f64) = (1e3, 1e7);
    pub const MAX_CONCENTRATION: (f64, f64) = (1e-6, 1e-3);
    pub const DATA_POINTS: (usize, usize) = (3, 100);
    pub const REPETITIONS: (usize, usize) = (1, 10);
    pub const RELATIVE_ERROR: (f64, f64) = (1e-3, 0.999);
}

/// The seven scalar inputs of one Monte Carlo run.
///
/// Missing fields in a JSON design file fall back to the reference defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticDesign {
    /// True `v_max` used to generate synthetic data.
    pub max_velocity: f64,
    /// True `k_m` used to generate synthetic data.
    pub michaelis_constant: f64,
    /// Highest substrate concentration of the design (last grid point).
    pub max_concentration: f64,
    /// Number of concentrations; each one halves the previous.
    pub data_points_num: usize,
    /// Noise standard deviation as a fraction of the true response.
    pub relative_error: f64,
    /// Measurements averaged per concentration.
    pub repetitions: usize,
    /// Number of noisy datasets to generate and fit.
    pub simulations: usize,
}

impl Default for KineticDesign {
    fn default() -> Self {
        Self {
            max_velocity: DEFAULT_MAX_VELOCITY,
            michaelis_constant: DEFAULT_MICHAELIS_CONSTANT,
            max_concentration: DEFAULT_MAX_CONCENTRATION,
            data_points_num: DEFAULT_DATA_POINTS,
            relative_error: DEFAULT_RELATIVE_ERROR,
            repetitions: DEFAULT_REPETITIONS,
            simulations: DEFAULT_SIMULATIONS,
        }
    }
}

impl KineticDesign {
    /// Reject inputs outside the engine's domain.
    pub fn validate(&self) -> Result<(), AppError> {
        require_positive("max_velocity", self.max_velocity)?;
        require_positive("michaelis_constant", self.michaelis_constant)?;
        require_positive("max_concentration", self.max_concentration)?;
        if self.data_points_num < 2 {
            return Err(AppError::invalid_design(format!(
                "data_points_num must be >= 2 (got {}).",
                self.data_points_num
            )));
        }
        if !(self.relative_error.is_finite() && self.relative_error >= 0.0) {
            return Err(AppError::invalid_design(format!(
                "relative_error must be finite and >= 0 (got {}).",
                self.relative_error
            )));
        }
        if self.repetitions < 1 {
            return Err(AppError::invalid_design("repetitions must be >= 1."));
        }
        if self.simulations < 1 {
            return Err(AppError::invalid_design("simulations must be >= 1."));
        }
        Ok(())
    }

    /// Enforce the ranges offered by the parameter source, on top of [`validate`].
    ///
    /// [`validate`]: KineticDesign::validate
    pub fn check_source_ranges(&self) -> Result<(), AppError> {
        use source_ranges::*;

        self.validate()?;
        require_within("michaelis_constant", self.michaelis_constant, MICHAELIS_CONSTANT)?;
        require_within("max_velocity", self.max_velocity, MAX_VELOCITY)?;
        require_within("max_concentration", self.max_concentration, MAX_CONCENTRATION)?;
        require_within("relative_error", self.relative_error, RELATIVE_ERROR)?;
        require_within_count("data_points_num", self.data_points_num, DATA_POINTS)?;
        require_within_count("repetitions", self.repetitions, REPETITIONS)?;
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_design(format!(
            "{name} must be finite and > 0 (got {value})."
        )))
    }
}

fn require_within(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), AppError> {
    if value >= lo && value <= hi {
        Ok(())
    } else {
        Err(AppError::invalid_design(format!(
            "{name}={value:e} is outside the supported range [{lo:e}, {hi:e}]."
        )))
    }
}

fn require_within_count(name: &str, value: usize, (lo, hi): (usize, usize)) -> Result<(), AppError> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(AppError::invalid_design(format!(
            "{name}={value} is outside the supported range [{lo}, {hi}]."
        )))
    }
}

/// Substrate concentrations of the design, strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationGrid(Vec<f64>);

impl ConcentrationGrid {
    /// Callers outside the grid builder go through [`crate::fit::build_grid`].
    pub(crate) fn from_points(points: Vec<f64>) -> Self {
        Self(points)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.0.last().copied()
    }
}

/// Noise-free responses, one per grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve(Vec<f64>);

impl ResponseCurve {
    pub(crate) fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One trial's perturbed responses. Consumed by a single fit.
#[derive(Debug, Clone, PartialEq)]
pub struct NoisyObservation(Vec<f64>);

impl NoisyObservation {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&ResponseCurve> for NoisyObservation {
    fn from(curve: &ResponseCurve) -> Self {
        Self(curve.0.clone())
    }
}

/// Starting point of the simplex search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub max_velocity: f64,
    pub michaelis_constant: f64,
}

impl InitialGuess {
    /// The fitter scales its search by the guess, so both entries must be usable divisors.
    pub fn validate(&self) -> Result<(), AppError> {
        let usable = |g: f64| g.is_finite() && g != 0.0;
        if usable(self.max_velocity) && usable(self.michaelis_constant) {
            Ok(())
        } else {
            Err(AppError::invalid_design(format!(
                "Initial guess must be finite and non-zero (got v_max={}, k_m={}).",
                self.max_velocity, self.michaelis_constant
            )))
        }
    }
}

impl Default for InitialGuess {
    /// Order-of-magnitude defaults for typical ATPase assays.
    fn default() -> Self {
        Self {
            max_velocity: 1e5,
            michaelis_constant: 1e-4,
        }
    }
}

/// Best-fit parameters of one trial plus optimizer diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub max_velocity: f64,
    pub michaelis_constant: f64,
    /// Sum of squared residuals at the returned point.
    pub sse: f64,
    /// Simplex iterations used (summed over restarts).
    pub iterations: usize,
    /// False when the iteration cap ran out before the tolerances were met.
    pub converged: bool,
}

/// Fitted parameters of every trial, in trial order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateCollections {
    pub max_velocities: Vec<f64>,
    pub michaelis_constants: Vec<f64>,
    /// Trials whose optimizer stopped at the iteration cap. Their values are
    /// still part of the collections.
    #[serde(default)]
    pub unconverged_trials: usize,
}

impl EstimateCollections {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            max_velocities: Vec::with_capacity(n),
            michaelis_constants: Vec::with_capacity(n),
            unconverged_trials: 0,
        }
    }

    pub fn push(&mut self, fit: &FitResult) {
        self.max_velocities.push(fit.max_velocity);
        self.michaelis_constants.push(fit.michaelis_constant);
        if !fit.converged {
            self.unconverged_trials += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.max_velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_velocities.is_empty()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, the optional design file, and defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub design: KineticDesign,
    pub seed: u64,
    pub initial_guess: InitialGuess,
    /// Simplex iteration cap per fit.
    pub max_iterations: usize,

    pub plot: bool,
    pub plot_bins: usize,
    pub plot_width: usize,

    pub export_estimates: Option<PathBuf>,
    pub export_run: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_design_is_valid_and_in_range() {
        let design = KineticDesign::default();
        design.validate().unwrap();
        design.check_source_ranges().unwrap();
    }

    #[test]
    fn validate_rejects_each_bad_field() {
        let bad = [
            KineticDesign { max_velocity: 0.0, ..Default::default() },
            KineticDesign { michaelis_constant: -1e-6, ..Default::default() },
            KineticDesign { max_concentration: f64::NAN, ..Default::default() },
            KineticDesign { data_points_num: 1, ..Default::default() },
            KineticDesign { relative_error: -0.1, ..Default::default() },
            KineticDesign { repetitions: 0, ..Default::default() },
            KineticDesign { simulations: 0, ..Default::default() },
        ];
        for design in bad {
            let err = design.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDesign, "{design:?}");
        }
    }

    #[test]
    fn zero_relative_error_is_valid_for_engine_but_not_source() {
        let design = KineticDesign { relative_error: 0.0, ..Default::default() };
        design.validate().unwrap();
        assert!(design.check_source_ranges().is_err());
    }

    #[test]
    fn source_ranges_reject_too_many_points() {
        let design = KineticDesign { data_points_num: 101, ..Default::default() };
        design.validate().unwrap();
        let err = design.check_source_ranges().unwrap_err();
        assert!(err.message().contains("data_points_num"));
    }

    #[test]
    fn design_json_fills_missing_fields_with_defaults() {
        let design: KineticDesign =
            serde_json::from_str(r#"{ "repetitions": 5, "relative_error": 0.05 }"#).unwrap();
        assert_eq!(design.repetitions, 5);
        assert_eq!(design.relative_error, 0.05);
        assert_eq!(design.data_points_num, DEFAULT_DATA_POINTS);
        assert_eq!(design.max_velocity, DEFAULT_MAX_VELOCITY);
    }

    #[test]
    fn initial_guess_rejects_zero_and_non_finite() {
        assert!(InitialGuess::default().validate().is_ok());
        let negative = InitialGuess {
            max_velocity: -1e5,
            ..InitialGuess::default()
        };
        assert!(negative.validate().is_ok());

        for (v, k) in [(0.0, 1e-4), (1e5, 0.0), (f64::NAN, 1e-4), (1e5, f64::INFINITY)] {
            let guess = InitialGuess {
                max_velocity: v,
                michaelis_constant: k,
            };
            assert_eq!(guess.validate().unwrap_err().kind(), ErrorKind::InvalidDesign);
        }
    }

    #[test]
    fn collections_count_unconverged_fits() {
        let mut out = EstimateCollections::with_capacity(2);
        let fit = FitResult {
            max_velocity: 1.0,
            michaelis_constant: 2.0,
            sse: 0.0,
            iterations: 10,
            converged: false,
        };
        out.push(&fit);
        out.push(&FitResult { converged: true, ..fit });
        assert_eq!(out.len(), 2);
        assert_eq!(out.unconverged_trials, 1);
        assert_eq!(out.michaelis_constants, vec![2.0, 2.0]);
    }
}
