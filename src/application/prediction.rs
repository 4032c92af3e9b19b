//! Prediction service: validate, encode, scale and classify one request.
//!
//! The service owns nothing but a shared handle to the loaded artifacts, so
//! it can be cloned freely and called from several threads at once. Each
//! call works on its own row.

use std::sync::Arc;

use crate::adapters::artifacts::ArtifactBundle;
use crate::domain::{
    encode, ClinicalInput, Column, EncodedRow, Prediction, PredictError, RawClinicalInput,
};
use crate::ports::{Classifier, Scaler};

/// Apply the scaler to the continuous columns of `row`.
///
/// Returns a new row; indicator columns are copied unchanged.
///
/// # Errors
/// Returns `PredictError::ScalerShapeMismatch` if the row does not carry the
/// columns the scaler was fitted on.
pub fn scale(row: &EncodedRow, scaler: &dyn Scaler) -> Result<EncodedRow, PredictError> {
    let positions: Vec<usize> = Column::CONTINUOUS
        .iter()
        .filter_map(|c| row.columns().iter().position(|rc| rc == c))
        .collect();

    if positions.len() != scaler.n_features() {
        return Err(PredictError::ScalerShapeMismatch {
            expected: scaler.n_features(),
            actual: positions.len(),
        });
    }

    let mut continuous: Vec<f64> = positions.iter().map(|&i| row.values()[i]).collect();
    scaler.transform(&mut continuous)?;

    let mut values = row.values().to_vec();
    for (&i, v) in positions.iter().zip(continuous) {
        values[i] = v;
    }
    Ok(EncodedRow::from_parts(row.columns().to_vec(), values))
}

/// Run the classifier on a fully scaled row.
///
/// # Errors
/// Returns `PredictError::ClassifierShapeMismatch` on a width mismatch and
/// `PredictError::InvalidProbabilities` if the classifier output is not a
/// distribution consistent with its label.
pub fn predict_row(row: &EncodedRow, classifier: &dyn Classifier) -> Result<Prediction, PredictError> {
    if row.len() != classifier.n_features() {
        return Err(PredictError::ClassifierShapeMismatch {
            expected: classifier.n_features(),
            actual: row.len(),
        });
    }

    let label = classifier.predict(row.values())?;
    let probabilities = classifier.predict_proba(row.values())?;
    Prediction::new(label, probabilities)
}

/// Service for running heart disease predictions.
#[derive(Debug, Clone)]
pub struct PredictionService {
    bundle: Arc<ArtifactBundle>,
}

impl PredictionService {
    /// Create a new prediction service over loaded artifacts.
    #[must_use]
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    #[must_use]
    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Encode `input` in the schema's column order, without scaling.
    #[must_use]
    pub fn encode(&self, input: &ClinicalInput) -> EncodedRow {
        encode(input, self.bundle.schema())
    }

    /// Run the full pipeline on one request.
    ///
    /// 1. Validate numeric ranges
    /// 2. Encode into the feature row
    /// 3. Scale the continuous columns
    /// 4. Classify
    ///
    /// # Errors
    /// Returns the typed failure of the first step that fails. The service
    /// stays usable for later requests.
    pub fn predict(&self, input: &ClinicalInput) -> Result<Prediction, PredictError> {
        if let Err(errors) = input.validate() {
            tracing::warn!("Rejected request with {} invalid fields", errors.len());
            return Err(PredictError::InvalidInput { errors });
        }

        tracing::debug!("Step 1: Encoding clinical input...");
        let row = self.encode(input);

        tracing::debug!("Step 2: Scaling {} continuous columns...", Column::CONTINUOUS.len());
        let scaled = scale(&row, self.bundle.scaler()).inspect_err(|e| {
            tracing::error!("Scaler rejected row: {}", e);
        })?;

        tracing::debug!("Step 3: Running classifier...");
        let prediction = predict_row(&scaled, self.bundle.classifier()).inspect_err(|e| {
            tracing::error!("Classifier rejected row: {}", e);
        })?;

        tracing::info!(
            "Prediction complete: label={}, risk={}",
            prediction.label.index(),
            prediction.risk_level()
        );
        Ok(prediction)
    }

    /// Resolve categorical labels, then run [`PredictionService::predict`].
    ///
    /// # Errors
    /// Returns `PredictError::UnknownCategory` for an unrecognised label, or
    /// any error of `predict`.
    pub fn predict_raw(&self, input: &RawClinicalInput) -> Result<Prediction, PredictError> {
        let parsed = input.parse().inspect_err(|e| {
            tracing::warn!("Rejected request: {}", e.kind());
        })?;
        self.predict(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{LogisticRegression, ScalerArtifact};
    use crate::domain::{FeatureSchema, HeartDiseaseClass, PROBABILITY_TOLERANCE};

    fn test_scaler() -> ScalerArtifact {
        ScalerArtifact::Standard {
            feature_names: None,
            mean: vec![53.5, 132.4, 198.8, 136.8, 0.89],
            scale: vec![9.4, 18.5, 109.4, 25.5, 1.07],
        }
    }

    fn test_service(coefficients: Vec<f64>, intercept: f64) -> PredictionService {
        let classifier = LogisticRegression {
            feature_names: None,
            coefficients,
            intercept,
        };
        let bundle = ArtifactBundle::from_parts(classifier, test_scaler(), FeatureSchema::default())
            .expect("Consistent test bundle");
        PredictionService::new(Arc::new(bundle))
    }

    #[test]
    fn test_scale_touches_only_continuous_columns() {
        let row = encode(&ClinicalInput::sample(), &FeatureSchema::default());
        let scaled = scale(&row, &test_scaler()).unwrap();

        for (i, column) in row.columns().iter().enumerate() {
            if column.is_continuous() {
                assert_ne!(row.values()[i], scaled.values()[i], "{column} should change");
            } else {
                assert_eq!(
                    row.values()[i].to_bits(),
                    scaled.values()[i].to_bits(),
                    "{column} should not change"
                );
            }
        }
        // Age: (54 - 53.5) / 9.4
        let age = scaled.get(Column::Age).unwrap();
        assert!((age - 0.5 / 9.4).abs() < 1e-12);
    }

    #[test]
    fn test_scale_rejects_wrong_scaler_width() {
        let row = encode(&ClinicalInput::sample(), &FeatureSchema::default());
        let wide = ScalerArtifact::Standard {
            feature_names: None,
            mean: vec![0.0; 6],
            scale: vec![1.0; 6],
        };
        assert_eq!(
            scale(&row, &wide).unwrap_err(),
            PredictError::ScalerShapeMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_predict_row_rejects_wrong_classifier_width() {
        let row = encode(&ClinicalInput::sample(), &FeatureSchema::default());
        let narrow = LogisticRegression {
            feature_names: None,
            coefficients: vec![0.0; 14],
            intercept: 0.0,
        };
        assert_eq!(
            predict_row(&row, &narrow).unwrap_err(),
            PredictError::ClassifierShapeMismatch {
                expected: 14,
                actual: 15
            }
        );
    }

    #[test]
    fn test_probabilities_sum_to_one_and_label_is_argmax() {
        let service = test_service(
            vec![0.2, 0.1, -0.3, 1.0, -0.4, 0.5, 1.2, -1.5, -1.3, -0.9, -0.1, -0.2, 0.9, 1.4, -1.1],
            -0.3,
        );
        for input in [
            ClinicalInput::sample(),
            ClinicalInput {
                age: 70.0,
                oldpeak: 3.0,
                ..ClinicalInput::sample()
            },
        ] {
            let prediction = service.predict(&input).unwrap();
            let [p0, p1] = prediction.probabilities;
            assert!((p0 + p1 - 1.0).abs() < PROBABILITY_TOLERANCE);
            assert_eq!(prediction.label, HeartDiseaseClass::argmax(prediction.probabilities));
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let service = test_service(vec![0.3; 15], 0.1);
        let a = service.predict(&ClinicalInput::sample()).unwrap();
        let b = service.predict(&ClinicalInput::sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_input_is_rejected_without_poisoning_service() {
        let service = test_service(vec![0.0; 15], 0.0);
        let bad = ClinicalInput {
            age: 12.0,
            ..ClinicalInput::sample()
        };
        assert!(matches!(
            service.predict(&bad),
            Err(PredictError::InvalidInput { .. })
        ));

        let prediction = service.predict(&ClinicalInput::sample()).unwrap();
        assert_eq!(prediction.probabilities, [0.5, 0.5]);
        assert_eq!(prediction.label, HeartDiseaseClass::NoHeartDisease);
    }

    #[test]
    fn test_predict_raw_unknown_category() {
        let service = test_service(vec![0.0; 15], 0.0);
        let mut raw = RawClinicalInput::from(&ClinicalInput::sample());
        raw.chest_pain = "XYZ".into();
        assert!(matches!(
            service.predict_raw(&raw),
            Err(PredictError::UnknownCategory { field: "chest_pain", .. })
        ));
    }

    #[test]
    fn test_service_is_shareable_across_threads() {
        let service = test_service(vec![0.1; 15], 0.0);
        let expected = service.predict(&ClinicalInput::sample()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let svc = service.clone();
                std::thread::spawn(move || svc.predict(&ClinicalInput::sample()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    }
}
