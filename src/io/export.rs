//! Export per-trial estimates to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::EstimateCollections;
use crate::error::AppError;

/// Write `trial,max_velocity,michaelis_constant` rows, one per trial.
pub fn write_estimates_csv(path: &Path, estimates: &EstimateCollections) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "trial,max_velocity,michaelis_constant")
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for (i, (v, k)) in estimates
        .max_velocities
        .iter()
        .zip(estimates.michaelis_constants.iter())
        .enumerate()
    {
        // `{:e}` prints the shortest exact representation, so values round-trip.
        writeln!(file, "{},{v:e},{k:e}", i + 1)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
