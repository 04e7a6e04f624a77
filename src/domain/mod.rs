//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the run inputs (`KineticDesign`, `InitialGuess`)
//! - per-run derived data (`ConcentrationGrid`, `ResponseCurve`)
//! - per-trial data (`NoisyObservation`, `FitResult`)
//! - the run output (`EstimateCollections`)

pub mod types;

pub use types::*;
