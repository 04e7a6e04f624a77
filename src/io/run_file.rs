//! Read/write run JSON files.
//!
//! A run file is the portable representation of one Monte Carlo run:
//! - tool name and generation timestamp
//! - the seed and the design (true parameters + experimental setup)
//! - every trial's estimates, in trial order
//!
//! `kmsim plot` re-renders the report from a run file without re-simulating.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EstimateCollections, KineticDesign};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub seed: u64,
    pub design: KineticDesign,
    pub estimates: EstimateCollections,
}

impl RunFile {
    pub fn new(seed: u64, design: KineticDesign, estimates: EstimateCollections) -> Self {
        Self {
            tool: "kmsim".to_string(),
            generated: Utc::now(),
            seed,
            design,
            estimates,
        }
    }
}

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create run JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .map_err(|e| AppError::io(format!("Failed to write run JSON: {e}")))?;

    Ok(())
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: RunFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::io(format!("Invalid run JSON: {e}")))?;

    if run.estimates.max_velocities.len() != run.estimates.michaelis_constants.len() {
        return Err(AppError::io(format!(
            "Run JSON has {} v_max estimates but {} k_m estimates.",
            run.estimates.max_velocities.len(),
            run.estimates.michaelis_constants.len()
        )));
    }
    Ok(run)
}
