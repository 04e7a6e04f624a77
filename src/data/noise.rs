//! Repeated-measurement noise.
//!
//! Each design point is "measured" `repetitions` times with independent
//! unit-normal errors scaled by `relative_error * response`. Only the mean of
//! the repeats is observed, so the effective noise standard deviation shrinks
//! as `1 / sqrt(repetitions)`.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::domain::{NoisyObservation, ResponseCurve};
use crate::error::AppError;

/// Perturb `curve` with one draw of averaged measurement noise.
///
/// Draw order is point-major: all repeats of point 0, then point 1, and so on.
/// With `relative_error == 0` the curve is returned unchanged (the generator is
/// still advanced so trial streams do not depend on the noise level).
pub fn draw<R: Rng + ?Sized>(
    curve: &ResponseCurve,
    relative_error: f64,
    repetitions: usize,
    rng: &mut R,
) -> Result<NoisyObservation, AppError> {
    if repetitions < 1 {
        return Err(AppError::invalid_design("repetitions must be >= 1."));
    }
    if !(relative_error.is_finite() && relative_error >= 0.0) {
        return Err(AppError::invalid_design(format!(
            "relative_error must be finite and >= 0 (got {relative_error})."
        )));
    }

    let values = curve
        .as_slice()
        .iter()
        .map(|&y| {
            let z = mean_standard_normal(repetitions, rng);
            if relative_error == 0.0 {
                y
            } else {
                y + z * relative_error * y
            }
        })
        .collect();

    Ok(NoisyObservation::new(values))
}

fn mean_standard_normal<R: Rng + ?Sized>(n: usize, rng: &mut R) -> f64 {
    let mut sum = 0.0;
    for _ in 0..n {
        let z: f64 = StandardNormal.sample(rng);
        sum += z;
    }
    sum / n as f64
}
