//! Prediction result types.
//!
//! Represents the output of the heart disease classifier and its display
//! mapping.

use serde::{Deserialize, Serialize};

use super::PredictError;

/// Tolerance for the probabilities of a distribution summing to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Display label of class 0.
pub const NO_HEART_DISEASE: &str = "No Heart Disease";

/// Display label of class 1.
pub const HEART_DISEASE: &str = "Heart Disease";

/// The two classes the model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartDiseaseClass {
    NoHeartDisease = 0,
    HeartDisease = 1,
}

impl HeartDiseaseClass {
    /// Class from its index in the probability vector.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::NoHeartDisease),
            1 => Some(Self::HeartDisease),
            _ => None,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoHeartDisease => NO_HEART_DISEASE,
            Self::HeartDisease => HEART_DISEASE,
        }
    }

    /// Index of the larger probability; ties go to class 0.
    #[must_use]
    pub fn argmax(probabilities: [f64; 2]) -> Self {
        if probabilities[1] > probabilities[0] {
            Self::HeartDisease
        } else {
            Self::NoHeartDisease
        }
    }
}

impl std::fmt::Display for HeartDiseaseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk level derived from the heart disease probability, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk of heart disease
    Low,
    /// Moderate risk, monitoring recommended
    Moderate,
    /// High risk, intervention recommended
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn from_probability(p: f64) -> Self {
        if p < 0.3 {
            Self::Low
        } else if p < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low estimated risk",
            Self::Moderate => "Moderate estimated risk - follow-up suggested",
            Self::High => "High estimated risk - consult a physician",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classifier output for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Discrete decision of the classifier
    pub label: HeartDiseaseClass,

    /// `[p(no heart disease), p(heart disease)]`
    pub probabilities: [f64; 2],
}

impl Prediction {
    /// Combine the classifier's label and probabilities.
    ///
    /// # Errors
    /// Returns `PredictError::InvalidProbabilities` if the pair is not a
    /// distribution or the label disagrees with it.
    pub fn new(label: HeartDiseaseClass, probabilities: [f64; 2]) -> Result<Self, PredictError> {
        let [p0, p1] = probabilities;
        if !p0.is_finite() || !p1.is_finite() {
            return Err(PredictError::InvalidProbabilities(format!(
                "non-finite values [{p0}, {p1}]"
            )));
        }
        let in_unit = |p: f64| (-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p);
        if !in_unit(p0) || !in_unit(p1) {
            return Err(PredictError::InvalidProbabilities(format!(
                "values [{p0}, {p1}] outside [0, 1]"
            )));
        }
        if (p0 + p1 - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PredictError::InvalidProbabilities(format!(
                "sum {} is not 1",
                p0 + p1
            )));
        }
        // Exact ties may be resolved either way by the classifier.
        if p0 != p1 && label != HeartDiseaseClass::argmax(probabilities) {
            return Err(PredictError::InvalidProbabilities(format!(
                "label {} disagrees with [{p0}, {p1}]",
                label.index()
            )));
        }

        Ok(Self {
            label,
            probabilities: [p0.clamp(0.0, 1.0), p1.clamp(0.0, 1.0)],
        })
    }

    /// Probability of heart disease.
    #[must_use]
    pub fn heart_disease_probability(&self) -> f64 {
        self.probabilities[1]
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.heart_disease_probability())
    }
}

/// Label-to-probability mapping handed to the presentation layer.
///
/// Serializes to `{"No Heart Disease": p0, "Heart Disease": p1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionDisplay {
    #[serde(rename = "No Heart Disease")]
    pub no_heart_disease: f64,

    #[serde(rename = "Heart Disease")]
    pub heart_disease: f64,
}

impl PredictionDisplay {
    /// Entries in class order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, f64); 2] {
        [
            (NO_HEART_DISEASE, self.no_heart_disease),
            (HEART_DISEASE, self.heart_disease),
        ]
    }
}

impl From<&Prediction> for PredictionDisplay {
    fn from(prediction: &Prediction) -> Self {
        Self {
            no_heart_disease: prediction.probabilities[0],
            heart_disease: prediction.probabilities[1],
        }
    }
}
