//! Synthetic measurement generation.

pub mod noise;

pub use noise::*;
