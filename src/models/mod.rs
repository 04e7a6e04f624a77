//! Michaelis–Menten rate law.
//!
//! The model is implemented as small, pure functions so that the measurement
//! model and the fitter share one definition of the curve.

pub mod model;

pub use model::*;
