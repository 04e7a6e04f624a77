//! The simulation loop.
//!
//! One run:
//! 1) validate the design and the initial guess (nothing is computed for invalid input)
//! 2) build the concentration grid and the noise-free response once
//! 3) per trial: draw a noisy observation, fit it, record the estimates
//!
//! Trials share only the read-only grid and curve. The random source is
//! injected by the caller so that a fixed seed gives bit-identical output.
//! Any fit divergence aborts the run; partial collections are never returned.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::draw;
use crate::domain::{EstimateCollections, InitialGuess, KineticDesign};
use crate::error::AppError;
use crate::fit::{FitOptions, build_grid, fit};
use crate::models::noise_free_response;

/// Options that apply to every trial of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationOptions {
    pub initial_guess: InitialGuess,
    pub fit: FitOptions,
}

/// Run `design.simulations` trials using `rng` for the measurement noise.
pub fn run<R: Rng + ?Sized>(
    design: &KineticDesign,
    rng: &mut R,
    opts: &SimulationOptions,
) -> Result<EstimateCollections, AppError> {
    design.validate()?;
    opts.initial_guess.validate()?;

    let grid = build_grid(design.max_concentration, design.data_points_num)?;
    let curve = noise_free_response(design.max_velocity, design.michaelis_constant, &grid);

    log::debug!(
        "simulating {} trials: v_max={:e}, k_m={:e}, points={} ({:e}..={:e}), rel_err={}, reps={}",
        design.simulations,
        design.max_velocity,
        design.michaelis_constant,
        grid.len(),
        grid.min().unwrap_or(f64::NAN),
        grid.max().unwrap_or(f64::NAN),
        design.relative_error,
        design.repetitions,
    );

    let mut out = EstimateCollections::with_capacity(design.simulations);
    for trial in 0..design.simulations {
        let observation = draw(&curve, design.relative_error, design.repetitions, rng)?;
        let result = fit(&grid, &observation, &opts.initial_guess, &opts.fit).map_err(|e| {
            log::error!("trial {trial} failed: {e}");
            AppError::new(e.kind(), format!("Trial {} of {}: {e}", trial + 1, design.simulations))
        })?;

        log::trace!(
            "trial {trial}: v_max={:e} k_m={:e} sse={:e} iters={} converged={}",
            result.max_velocity,
            result.michaelis_constant,
            result.sse,
            result.iterations,
            result.converged
        );
        out.push(&result);
    }

    if out.unconverged_trials > 0 {
        log::warn!(
            "{} of {} fits stopped at the iteration cap ({}); their last simplex points were kept.",
            out.unconverged_trials,
            design.simulations,
            opts.fit.simplex.max_iterations
        );
    }
    log::debug!("simulation finished: {} estimate pairs", out.len());

    Ok(out)
}

/// [`run`] with a `StdRng` seeded from `seed`.
pub fn run_seeded(
    design: &KineticDesign,
    seed: u64,
    opts: &SimulationOptions,
) -> Result<EstimateCollections, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    run(design, &mut rng, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::math::variance;

    fn design(relative_error: f64, repetitions: usize, simulations: usize) -> KineticDesign {
        KineticDesign {
            relative_error,
            repetitions,
            simulations,
            ..KineticDesign::default()
        }
    }

    #[test]
    fn output_has_one_pair_per_simulation() {
        for sims in [1, 7, 40] {
            let out = run_seeded(&design(0.15, 3, sims), 42, &SimulationOptions::default()).unwrap();
            assert_eq!(out.max_velocities.len(), sims);
            assert_eq!(out.michaelis_constants.len(), sims);
        }
    }

    #[test]
    fn fixed_seed_is_bit_identical() {
        let d = design(0.3, 2, 25);
        let a = run_seeded(&d, 1234, &SimulationOptions::default()).unwrap();
        let b = run_seeded(&d, 1234, &SimulationOptions::default()).unwrap();
        assert_eq!(a, b);

        let c = run_seeded(&d, 1235, &SimulationOptions::default()).unwrap();
        assert_ne!(a.michaelis_constants, c.michaelis_constants);
    }

    #[test]
    fn trials_are_recorded_in_draw_order() {
        let d = design(0.2, 3, 5);
        let opts = SimulationOptions::default();
        let out = run_seeded(&d, 9, &opts).unwrap();

        let grid = build_grid(d.max_concentration, d.data_points_num).unwrap();
        let curve = noise_free_response(d.max_velocity, d.michaelis_constant, &grid);
        let mut rng = StdRng::seed_from_u64(9);
        for trial in 0..d.simulations {
            let obs = draw(&curve, d.relative_error, d.repetitions, &mut rng).unwrap();
            let f = fit(&grid, &obs, &opts.initial_guess, &opts.fit).unwrap();
            assert_eq!(out.max_velocities[trial], f.max_velocity);
            assert_eq!(out.michaelis_constants[trial], f.michaelis_constant);
        }
    }

    #[test]
    fn noise_free_run_recovers_truth() {
        let d = KineticDesign {
            max_velocity: 1e5,
            michaelis_constant: 1e-4,
            max_concentration: 1e-4,
            data_points_num: 5,
            relative_error: 0.0,
            repetitions: 1,
            simulations: 1,
        };
        let out = run_seeded(&d, 0, &SimulationOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out.max_velocities[0] / 1e5 - 1.0).abs() < 1e-3);
        assert!((out.michaelis_constants[0] / 1e-4 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn more_noise_widens_km_distribution() {
        let opts = SimulationOptions::default();
        let low = run_seeded(&design(0.05, 1, 300), 77, &opts).unwrap();
        let high = run_seeded(&design(0.2, 1, 300), 77, &opts).unwrap();
        let v_low = variance(&low.michaelis_constants).unwrap();
        let v_high = variance(&high.michaelis_constants).unwrap();
        assert!(v_high > v_low, "var(k_m) at 5%={v_low:e} vs 20%={v_high:e}");
    }

    #[test]
    fn more_repetitions_narrow_distributions() {
        let opts = SimulationOptions::default();
        let single = run_seeded(&design(0.15, 1, 300), 5, &opts).unwrap();
        let many = run_seeded(&design(0.15, 9, 300), 5, &opts).unwrap();
        assert!(variance(&many.michaelis_constants).unwrap() < variance(&single.michaelis_constants).unwrap());
        assert!(variance(&many.max_velocities).unwrap() < variance(&single.max_velocities).unwrap());
    }

    #[test]
    fn invalid_design_fails_before_simulating() {
        let mut rng = StdRng::seed_from_u64(3);
        let before: u64 = rng.clone().r#gen();
        let err = run(&design(0.1, 0, 10), &mut rng, &SimulationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDesign);
        // The generator was not touched.
        let after: u64 = rng.r#gen();
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_initial_guess_fails_before_simulating() {
        let mut rng = StdRng::seed_from_u64(3);
        let before: u64 = rng.clone().r#gen();
        let opts = SimulationOptions {
            initial_guess: InitialGuess {
                max_velocity: 0.0,
                michaelis_constant: 1e-4,
            },
            ..SimulationOptions::default()
        };
        let err = run(&design(0.1, 3, 10), &mut rng, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDesign);
        assert!(!err.message().starts_with("Trial"), "{}", err.message());
        let after: u64 = rng.r#gen();
        assert_eq!(before, after);
    }

    #[test]
    fn divergent_trial_aborts_whole_run() {
        // Responses near 1e300 with huge noise overflow the residuals.
        let d = KineticDesign {
            max_velocity: 1e300,
            relative_error: 1e10,
            simulations: 5,
            ..KineticDesign::default()
        };
        let err = run_seeded(&d, 1, &SimulationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FitDivergence);
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().starts_with("Trial 1 of 5: "), "{}", err.message());
    }

    #[test]
    fn tight_iteration_cap_is_counted() {
        let mut opts = SimulationOptions::default();
        opts.fit = opts.fit.with_max_iterations(2);
        let out = run_seeded(&design(0.1, 3, 10), 1, &opts).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out.unconverged_trials, 10);
    }
}
