//! Mathematical utilities: simplex minimization and sample statistics.

pub mod simplex;
pub mod stats;

pub use simplex::*;
pub use stats::*;
