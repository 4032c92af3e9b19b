//! Model ports: Traits for the persisted scaler and classifier.
//!
//! These traits abstract the serialized artifacts from the prediction
//! pipeline so the pipeline can be tested with in-memory models.

use crate::domain::{HeartDiseaseClass, PredictError};

/// A pre-fitted feature scaling transform.
///
/// Implementations are immutable after loading and safe to share between
/// threads.
pub trait Scaler: Send + Sync {
    /// Number of columns the transform was fitted on.
    fn n_features(&self) -> usize;

    /// Column names recorded at fit time, if the artifact carries them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Past participle naming the transform, e.g. "standardized".
    fn method(&self) -> &'static str {
        "scaled"
    }

    /// Transform `values` in place.
    ///
    /// # Errors
    /// Returns `PredictError::ScalerShapeMismatch` if `values` has the wrong
    /// width.
    fn transform(&self, values: &mut [f64]) -> Result<(), PredictError>;
}

/// A pre-trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Number of columns the model was trained on.
    fn n_features(&self) -> usize;

    /// Column names recorded at fit time, if the artifact carries them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Discrete decision for one row.
    ///
    /// # Errors
    /// Returns `PredictError::ClassifierShapeMismatch` if `row` has the wrong
    /// width.
    fn predict(&self, row: &[f64]) -> Result<HeartDiseaseClass, PredictError>;

    /// `[p(class 0), p(class 1)]` for one row.
    ///
    /// # Errors
    /// Returns `PredictError::ClassifierShapeMismatch` if `row` has the wrong
    /// width.
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictError>;
}
