//! Domain layer: Core types and pure logic.
//!
//! Nothing here touches the filesystem or the terminal. Encoding is a pure
//! function of the clinical input and the feature schema.

pub mod clinical;
mod error;
pub mod features;
mod prediction;

pub use clinical::{
    ChestPainType, ClinicalInput, ExerciseAngina, FastingBloodSugar, RawClinicalInput, RawFlag,
    RestingEcg, Sex, StSlope, AGE_RANGE,
};
pub use error::PredictError;
pub use features::{encode, encode_raw, Column, EncodedRow, FeatureSchema, SchemaError, FEATURE_COUNT};
pub use prediction::{
    HeartDiseaseClass, Prediction, PredictionDisplay, RiskLevel, HEART_DISEASE, NO_HEART_DISEASE,
    PROBABILITY_TOLERANCE,
};
