//! Monte Carlo estimation of the kinetic parameter distributions.

pub mod monte_carlo;

pub use monte_carlo::*;
