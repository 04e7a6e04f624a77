//! `km-sim` library crate.
//!
//! Monte Carlo estimation of how precisely a Michaelis-Menten experiment
//! pins down `v_max` and `k_m`.
//!
//! The binary (`kmsim`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the engine can be driven directly (`sim::run_seeded`) by other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod sim;
