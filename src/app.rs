//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the design (flags over design file over defaults)
//! - runs the Monte Carlo engine
//! - prints summaries/histograms
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DesignArgs, EngineArgs, PlotArgs, RunArgs, SweepArgs, SweepAxis};
use crate::domain::{InitialGuess, KineticDesign, RunConfig};
use crate::error::AppError;
use crate::report::{Parameter, summarize_run};

pub mod pipeline;

/// Entry point for the `kmsim` binary.
pub fn run() -> Result<(), AppError> {
    // `kmsim` and `kmsim --relative-error 0.1` behave like `kmsim run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_simulation(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.design, &run.summary, run.seed)
    );

    if config.plot {
        println!(
            "{}",
            render_histograms(&run.design, &run.estimates, config.plot_bins, config.plot_width)
        );
    }

    // Optional exports.
    if let Some(path) = &config.export_estimates {
        crate::io::write_estimates_csv(path, &run.estimates)?;
        log::info!("wrote estimates to {}", path.display());
    }
    if let Some(path) = &config.export_run {
        let file = crate::io::RunFile::new(run.seed, run.design, run.estimates.clone());
        crate::io::write_run_json(path, &file)?;
        log::info!("wrote run to {}", path.display());
    }

    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let design = resolve_design(&args.design)?;
    let config = engine_config(design, &args.engine);

    let plan = match args.over {
        SweepAxis::Repetitions => pipeline::SweepPlan::Repetitions {
            max: args.max_repetitions,
        },
        SweepAxis::RelativeError => pipeline::SweepPlan::RelativeError {
            min: args.error_min,
            max: args.error_max,
            steps: args.error_steps,
        },
    };
    let designs = pipeline::sweep_designs(&design, &plan)?;
    let rows = pipeline::run_sweep(&config, &designs)?;

    println!(
        "Sweep: {} designs x {} simulations | seed={}\n",
        rows.len(),
        design.simulations,
        config.seed
    );
    println!("{}", crate::report::format_sweep(&rows));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_run_json(&args.run)?;
    let summary = summarize_run(&file.design, &file.estimates);

    println!(
        "{}",
        crate::report::format_run_summary(&file.design, &summary, file.seed)
    );
    println!(
        "{}",
        render_histograms(&file.design, &file.estimates, args.bins, args.width)
    );
    Ok(())
}

fn render_histograms(
    design: &KineticDesign,
    estimates: &crate::domain::EstimateCollections,
    bins: usize,
    width: usize,
) -> String {
    let km = crate::plot::render_histogram(
        Parameter::MichaelisConstant,
        &estimates.michaelis_constants,
        design.michaelis_constant,
        bins,
        width,
    );
    let vmax = crate::plot::render_histogram(
        Parameter::MaxVelocity,
        &estimates.max_velocities,
        design.max_velocity,
        bins,
        width,
    );
    format!("{km}\n{vmax}")
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let design = resolve_design(&args.design)?;
    let mut config = engine_config(design, &args.engine);
    config.plot = !args.histogram.no_plot;
    config.plot_bins = args.histogram.bins;
    config.plot_width = args.histogram.width;
    config.export_estimates = args.export.clone();
    config.export_run = args.export_run.clone();
    Ok(config)
}

fn engine_config(design: KineticDesign, engine: &EngineArgs) -> RunConfig {
    RunConfig {
        design,
        seed: engine.seed,
        initial_guess: InitialGuess {
            max_velocity: engine.initial_vmax,
            michaelis_constant: engine.initial_km,
        },
        max_iterations: engine.max_iterations,
        plot: false,
        plot_bins: 20,
        plot_width: 60,
        export_estimates: None,
        export_run: None,
    }
}

/// Flags override the design file, which overrides the defaults.
///
/// The result is checked against the parameter-source ranges.
pub fn resolve_design(args: &DesignArgs) -> Result<KineticDesign, AppError> {
    let mut design = match &args.design {
        Some(path) => crate::io::read_design_json(path)?,
        None => KineticDesign::default(),
    };

    if let Some(v) = args.max_velocity {
        design.max_velocity = v;
    }
    if let Some(v) = args.michaelis_constant {
        design.michaelis_constant = v;
    }
    if let Some(v) = args.max_concentration {
        design.max_concentration = v;
    }
    if let Some(v) = args.data_points_num {
        design.data_points_num = v;
    }
    if let Some(v) = args.repetitions {
        design.repetitions = v;
    }
    if let Some(v) = args.relative_error {
        design.relative_error = v;
    }
    if let Some(v) = args.simulations {
        design.simulations = v;
    }

    design.check_source_ranges()?;
    Ok(design)
}

/// Rewrite argv so `kmsim` defaults to `kmsim run`.
///
/// Rules:
/// - `kmsim`                      -> `kmsim run`
/// - `kmsim --points 8 ...`       -> `kmsim run --points 8 ...`
/// - `kmsim --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "sweep" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs() {
        assert_eq!(rewrite_args(argv(&["kmsim"])), argv(&["kmsim", "run"]));
    }

    #[test]
    fn leading_flag_runs() {
        assert_eq!(
            rewrite_args(argv(&["kmsim", "--points", "8"])),
            argv(&["kmsim", "run", "--points", "8"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        for a in [&["kmsim", "sweep"][..], &["kmsim", "--help"][..], &["kmsim", "plot", "--run", "x"][..]] {
            assert_eq!(rewrite_args(argv(a)), argv(a));
        }
    }

    #[test]
    fn flags_override_design_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.json");
        std::fs::write(&path, r#"{ "repetitions": 5, "data_points_num": 8 }"#).unwrap();

        let args = DesignArgs {
            design: Some(path),
            repetitions: Some(2),
            ..DesignArgs::default()
        };
        let design = resolve_design(&args).unwrap();
        assert_eq!(design.repetitions, 2);
        assert_eq!(design.data_points_num, 8);
        assert_eq!(design.max_velocity, KineticDesign::default().max_velocity);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let args = DesignArgs {
            relative_error: Some(1.5),
            ..DesignArgs::default()
        };
        assert_eq!(resolve_design(&args).unwrap_err().kind(), ErrorKind::InvalidDesign);
    }
}
