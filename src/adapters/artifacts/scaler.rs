//! Scaler artifacts exported from the training notebook.

use serde::{Deserialize, Serialize};

use crate::domain::PredictError;
use crate::ports::Scaler;

/// Serialized scaler, dispatched on `kind`.
///
/// - `standard`: `(x - mean) / scale`
/// - `min_max`: `x * scale + min`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl ScalerArtifact {
    /// Structural checks run once at load time.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        let (offset, scale, names) = match self {
            Self::Standard {
                mean,
                scale,
                feature_names,
            } => (mean, scale, feature_names),
            Self::MinMax {
                min,
                scale,
                feature_names,
            } => (min, scale, feature_names),
        };

        if scale.is_empty() {
            return Err("scaler has no columns".into());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "offset has {} entries, scale has {}",
                offset.len(),
                scale.len()
            ));
        }
        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".into());
        }
        if matches!(self, Self::Standard { .. }) && scale.iter().any(|s| *s == 0.0) {
            return Err("standard scaler has a zero scale".into());
        }
        if let Some(names) = names {
            if names.len() != scale.len() {
                return Err(format!(
                    "feature_names has {} entries, scaler has {} columns",
                    names.len(),
                    scale.len()
                ));
            }
        }
        Ok(())
    }
}

impl Scaler for ScalerArtifact {
    fn n_features(&self) -> usize {
        match self {
            Self::Standard { scale, .. } | Self::MinMax { scale, .. } => scale.len(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            }
        }
    }

    fn method(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standardized",
            Self::MinMax { .. } => "min-max scaled",
        }
    }

    fn transform(&self, values: &mut [f64]) -> Result<(), PredictError> {
        let expected = self.n_features();
        if values.len() != expected {
            return Err(PredictError::ScalerShapeMismatch {
                expected,
                actual: values.len(),
            });
        }

        match self {
            Self::Standard { mean, scale, .. } => {
                for ((x, m), s) in values.iter_mut().zip(mean).zip(scale) {
                    *x = (*x - m) / s;
                }
            }
            Self::MinMax { min, scale, .. } => {
                for ((x, m), s) in values.iter_mut().zip(min).zip(scale) {
                    *x = *x * s + m;
                }
            }
        }
        Ok(())
    }
}
