//! Application layer: Use cases and services.
//!
//! This module runs the encode → scale → classify pipeline over the loaded
//! artifacts.

mod prediction;

pub use prediction::{predict_row, scale, PredictionService};
