//! Load a `KineticDesign` from a JSON file.
//!
//! Any field may be omitted; omitted fields take the reference defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::KineticDesign;
use crate::error::AppError;

pub fn read_design_json(path: &Path) -> Result<KineticDesign, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open design JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::io(format!("Invalid design JSON '{}': {e}", path.display())))
}
