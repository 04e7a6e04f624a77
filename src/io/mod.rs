//! Input/output helpers.
//!
//! - design JSON loading (`design`)
//! - per-trial estimate export to CSV (`export`)
//! - run JSON read/write (`run_file`)

pub mod design;
pub mod export;
pub mod run_file;

pub use design::*;
pub use export::*;
pub use run_file::*;
