//! Command-line parsing for the Michaelis–Menten Monte Carlo tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the simulation/fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "kmsim",
    version,
    about = "Monte Carlo precision estimates for Michaelis-Menten kinetic parameters"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate one design, print parameter distributions, and optionally export.
    Run(RunArgs),
    /// Compare designs along one axis (repetitions or relative error).
    ///
    /// Designs are simulated concurrently; each one runs the sequential engine
    /// with the same seed, so rows differ only by the swept setting.
    Sweep(SweepArgs),
    /// Re-render the report of a previously exported run JSON.
    Plot(PlotArgs),
}

/// The seven design inputs.
///
/// Unset flags fall back to `--design` (if given), then to the reference defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct DesignArgs {
    /// JSON file with any subset of the design fields.
    #[arg(long, value_name = "JSON")]
    pub design: Option<PathBuf>,

    /// True Michaelis constant [default: 4.2e-5].
    #[arg(long = "km")]
    pub michaelis_constant: Option<f64>,

    /// True maximum reaction velocity [default: 2.42e5].
    #[arg(long = "vmax")]
    pub max_velocity: Option<f64>,

    /// Highest substrate concentration [default: 1e-4].
    #[arg(long)]
    pub max_concentration: Option<f64>,

    /// Number of concentrations, each half of the next [default: 13].
    #[arg(long = "points")]
    pub data_points_num: Option<usize>,

    /// Measurements averaged per concentration [default: 3].
    #[arg(long)]
    pub repetitions: Option<usize>,

    /// Noise standard deviation relative to the true response [default: 0.15].
    #[arg(long)]
    pub relative_error: Option<f64>,

    /// Number of synthetic datasets [default: 1000].
    #[arg(long)]
    pub simulations: Option<usize>,
}

/// Engine knobs shared by `run` and `sweep`.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Random seed for the measurement noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Starting v_max of every fit.
    #[arg(long, default_value_t = 1e5)]
    pub initial_vmax: f64,

    /// Starting k_m of every fit.
    #[arg(long, default_value_t = 1e-4)]
    pub initial_km: f64,

    /// Simplex iteration cap per fit; hitting it is reported, not fatal.
    #[arg(long, default_value_t = 2000)]
    pub max_iterations: usize,
}

/// Histogram options.
#[derive(Debug, Args, Clone)]
pub struct HistogramArgs {
    /// Disable the terminal histograms.
    #[arg(long)]
    pub no_plot: bool,

    /// Histogram bins.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Histogram bar width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub histogram: HistogramArgs,

    /// Export per-trial estimates to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the run (design + seed + estimates) to JSON.
    #[arg(long = "export-run", value_name = "JSON")]
    pub export_run: Option<PathBuf>,
}

/// Which design input a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepAxis {
    /// 1, 2, ..., --max-repetitions
    Repetitions,
    /// --error-steps values, base-2 log-spaced in [--error-min, --error-max]
    RelativeError,
}

#[derive(Debug, Parser, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Design input to vary.
    #[arg(long, value_enum, default_value_t = SweepAxis::Repetitions)]
    pub over: SweepAxis,

    /// Largest repetition count for `--over repetitions`.
    #[arg(long, default_value_t = 10)]
    pub max_repetitions: usize,

    /// Smallest relative error for `--over relative-error`.
    #[arg(long, default_value_t = 0.025)]
    pub error_min: f64,

    /// Largest relative error for `--over relative-error`.
    #[arg(long, default_value_t = 0.4)]
    pub error_max: f64,

    /// Number of relative errors for `--over relative-error`.
    #[arg(long, default_value_t = 5)]
    pub error_steps: usize,
}

/// Options for re-rendering a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Run JSON file produced by `kmsim run --export-run`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Histogram bins.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Histogram bar width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}
