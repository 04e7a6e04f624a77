//! Reporting utilities: tolerance-band coverage, summaries, and formatted output.
//!
//! Everything here consumes `EstimateCollections` read-only; the engine does
//! not depend on this module.

use crate::domain::{EstimateCollections, KineticDesign};
use crate::math::{ecdf_sorted, mean, quantile_sorted, sorted_finite, std_dev};

pub mod format;

pub use format::*;

/// Half-widths of the tolerance bands around the true value, widest first.
pub const BAND_FRACTIONS: [f64; 3] = [0.3, 0.2, 0.1];

/// Which kinetic parameter a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    MichaelisConstant,
    MaxVelocity,
}

impl Parameter {
    pub fn display_name(self) -> &'static str {
        match self {
            Parameter::MichaelisConstant => "Michaelis constant",
            Parameter::MaxVelocity => "Maximum velocity",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Parameter::MichaelisConstant => "k_m",
            Parameter::MaxVelocity => "v_max",
        }
    }
}

/// Probability mass of the estimates inside one tolerance band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCoverage {
    pub fraction: f64,
    pub lower: f64,
    pub upper: f64,
    pub probability: f64,
}

/// Summary of one parameter's empirical distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSummary {
    pub parameter: Parameter,
    pub truth: f64,
    pub n: usize,
    /// Samples excluded from the statistics because they were not finite.
    pub n_non_finite: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub median: Option<f64>,
    pub q025: Option<f64>,
    pub q975: Option<f64>,
    pub bands: Vec<BandCoverage>,
}

impl ParameterSummary {
    /// `(mean - truth) / truth`.
    pub fn relative_bias(&self) -> Option<f64> {
        self.mean.map(|m| (m - self.truth) / self.truth)
    }

    pub fn band(&self, fraction: f64) -> Option<&BandCoverage> {
        self.bands.iter().find(|b| (b.fraction - fraction).abs() < 1e-12)
    }
}

/// Summaries for both parameters of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub michaelis_constant: ParameterSummary,
    pub max_velocity: ParameterSummary,
    pub unconverged_trials: usize,
}

/// ECDF mass in `(truth (1 - fraction), truth (1 + fraction)]`.
///
/// Computed as `ecdf(upper) - ecdf(lower)`, so an estimate sitting exactly on
/// the lower edge is not counted.
pub fn band_coverage(estimates: &[f64], truth: f64, fraction: f64) -> BandCoverage {
    let sorted = sorted_finite(estimates);
    band_from_sorted(&sorted, estimates.len(), truth, fraction)
}

fn band_from_sorted(sorted: &[f64], n_total: usize, truth: f64, fraction: f64) -> BandCoverage {
    let a = truth * (1.0 - fraction);
    let b = truth * (1.0 + fraction);
    let (lower, upper) = if a <= b { (a, b) } else { (b, a) };

    // Rescale to the full sample size so non-finite estimates count as misses.
    let finite_share = if n_total == 0 { 0.0 } else { sorted.len() as f64 / n_total as f64 };
    let probability = (ecdf_sorted(sorted, upper) - ecdf_sorted(sorted, lower)) * finite_share;

    BandCoverage {
        fraction,
        lower,
        upper,
        probability,
    }
}

pub fn summarize_parameter(parameter: Parameter, estimates: &[f64], truth: f64) -> ParameterSummary {
    let sorted = sorted_finite(estimates);
    let bands = BAND_FRACTIONS
        .iter()
        .map(|&f| band_from_sorted(&sorted, estimates.len(), truth, f))
        .collect();

    ParameterSummary {
        parameter,
        truth,
        n: estimates.len(),
        n_non_finite: estimates.len() - sorted.len(),
        mean: mean(&sorted),
        std_dev: std_dev(&sorted),
        median: quantile_sorted(&sorted, 0.5),
        q025: quantile_sorted(&sorted, 0.025),
        q975: quantile_sorted(&sorted, 0.975),
        bands,
    }
}

pub fn summarize_run(design: &KineticDesign, estimates: &EstimateCollections) -> RunSummary {
    RunSummary {
        michaelis_constant: summarize_parameter(
            Parameter::MichaelisConstant,
            &estimates.michaelis_constants,
            design.michaelis_constant,
        ),
        max_velocity: summarize_parameter(Parameter::MaxVelocity, &estimates.max_velocities, design.max_velocity),
        unconverged_trials: estimates.unconverged_trials,
    }
}
