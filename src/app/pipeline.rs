//! Shared "simulation pipeline" logic used by the `run` and `sweep` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! design -> Monte Carlo estimates -> summary
//!
//! The commands can then focus on presentation and exports.

use rayon::prelude::*;

use crate::domain::{EstimateCollections, KineticDesign, RunConfig};
use crate::error::AppError;
use crate::fit::{FitOptions, log2_space};
use crate::report::{RunSummary, SweepRow, summarize_run};
use crate::sim::{SimulationOptions, run_seeded};

/// All computed outputs of a single `kmsim run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub design: KineticDesign,
    pub seed: u64,
    pub estimates: EstimateCollections,
    pub summary: RunSummary,
}

/// How a sweep derives its designs from the base design.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepPlan {
    /// `repetitions = 1..=max`.
    Repetitions { max: usize },
    /// `relative_error` over `steps` base-2 log-spaced values in `[min, max]`.
    RelativeError { min: f64, max: f64, steps: usize },
}

pub fn simulation_options(config: &RunConfig) -> SimulationOptions {
    SimulationOptions {
        initial_guess: config.initial_guess,
        fit: FitOptions::default().with_max_iterations(config.max_iterations),
    }
}

/// Execute one Monte Carlo run and summarize it.
pub fn run_simulation(config: &RunConfig) -> Result<RunOutput, AppError> {
    let opts = simulation_options(config);
    let estimates = run_seeded(&config.design, config.seed, &opts)?;
    let summary = summarize_run(&config.design, &estimates);

    Ok(RunOutput {
        design: config.design,
        seed: config.seed,
        estimates,
        summary,
    })
}

/// Expand the base design along the sweep axis.
pub fn sweep_designs(base: &KineticDesign, plan: &SweepPlan) -> Result<Vec<KineticDesign>, AppError> {
    let designs: Vec<KineticDesign> = match *plan {
        SweepPlan::Repetitions { max } => {
            if max < 1 {
                return Err(AppError::invalid_design("Sweep needs max repetitions >= 1."));
            }
            (1..=max)
                .map(|repetitions| KineticDesign { repetitions, ..*base })
                .collect()
        }
        SweepPlan::RelativeError { min, max, steps } => log2_space(min, max, steps)?
            .into_iter()
            .map(|relative_error| KineticDesign { relative_error, ..*base })
            .collect(),
    };

    for d in &designs {
        d.check_source_ranges()?;
    }
    Ok(designs)
}

/// Simulate every design concurrently.
///
/// Each design runs the sequential engine with `config.seed`, so designs that
/// only differ in `relative_error` see the same underlying normal draws.
/// Rows come back in `designs` order. The first failing design fails the sweep.
pub fn run_sweep(config: &RunConfig, designs: &[KineticDesign]) -> Result<Vec<SweepRow>, AppError> {
    let opts = simulation_options(config);
    log::debug!("sweeping {} designs on {} threads", designs.len(), rayon::current_num_threads());

    designs
        .par_iter()
        .map(|design| {
            let estimates = run_seeded(design, config.seed, &opts)?;
            Ok(SweepRow {
                design: *design,
                summary: summarize_run(design, &estimates),
            })
        })
        .collect()
}
