//! Per-request error type.
//!
//! Every variant describes a failure of a single prediction call. None of
//! them are fatal to the process; callers render the message and accept the
//! next request.

/// Error returned by a single prediction request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("Unknown {field} category: {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    #[error("Invalid clinical input: {}", .errors.join(", "))]
    InvalidInput { errors: Vec<String> },

    #[error("Scaler expects {expected} columns, got {actual}")]
    ScalerShapeMismatch { expected: usize, actual: usize },

    #[error("Classifier expects {expected} columns, got {actual}")]
    ClassifierShapeMismatch { expected: usize, actual: usize },

    #[error("Classifier returned an invalid probability distribution: {0}")]
    InvalidProbabilities(String),
}

impl PredictError {
    /// Stable machine-readable name of the failure.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "unknown_category",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ScalerShapeMismatch { .. } => "scaler_shape_mismatch",
            Self::ClassifierShapeMismatch { .. } => "classifier_shape_mismatch",
            Self::InvalidProbabilities(_) => "invalid_probabilities",
        }
    }

    /// Short hint telling the operator what to fix.
    #[must_use]
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "Choose one of the listed options for this field.",
            Self::InvalidInput { .. } => "Correct the highlighted values and submit again.",
            Self::ScalerShapeMismatch { .. } | Self::ClassifierShapeMismatch { .. } => {
                "The model artifacts disagree with each other; re-export them together."
            }
            Self::InvalidProbabilities(_) => {
                "The classifier artifact is damaged; re-export heart_disease_model.json."
            }
        }
    }
}
