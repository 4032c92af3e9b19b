//! # Heartcheck
//!
//! Heart disease risk estimation from eleven clinical measurements, using a
//! classifier and scaler trained elsewhere and loaded from disk.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Clinical input, feature encoding, prediction types
//! - `ports`: Trait definitions for the scaler and classifier
//! - `adapters`: Artifact loading and log sanitization
//! - `application`: The encode → scale → classify pipeline
//! - `tui`: Terminal user interface
//!
//! ```no_run
//! use std::sync::Arc;
//! use heartcheck::adapters::artifacts::ArtifactBundle;
//! use heartcheck::application::PredictionService;
//! use heartcheck::domain::{ClinicalInput, PredictionDisplay};
//!
//! let bundle = ArtifactBundle::load(std::path::Path::new("models"))?;
//! let service = PredictionService::new(Arc::new(bundle));
//! let prediction = service.predict(&ClinicalInput::sample())?;
//! println!("{:?}", PredictionDisplay::from(&prediction));
//! # Ok::<(), heartcheck::HeartcheckError>(())
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{ClinicalInput, Prediction, PredictionDisplay, RiskLevel};

/// Result type for Heartcheck operations
pub type Result<T> = std::result::Result<T, HeartcheckError>;

/// Main error type for Heartcheck
#[derive(Debug, thiserror::Error)]
pub enum HeartcheckError {
    #[error("Failed to load model artifacts: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Prediction failed: {0}")]
    Predict(#[from] domain::PredictError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
