//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: JSON/text model artifacts on disk
//! - `sanitize`: clinical value filtering for logs

pub mod artifacts;
pub mod sanitize;

// Re-export artifact error for lib.rs
pub use artifacts::ArtifactError;
