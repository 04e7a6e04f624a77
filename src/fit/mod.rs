//! Curve fitting building blocks.
//!
//! Responsibilities:
//!
//! - build the substrate concentration grid of a design
//! - recover `(v_max, k_m)` from one noisy dataset

pub mod fitter;
pub mod grid;

pub use fitter::*;
pub use grid::*;
