//! End-to-end tests against the artifacts shipped in `models/`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use heartcheck::adapters::artifacts::{
    ArtifactBundle, ArtifactManifest, FEATURE_NAMES_FILE, MODEL_FILE, SCALER_FILE,
};
use heartcheck::adapters::ArtifactError;
use heartcheck::application::PredictionService;
use heartcheck::domain::{
    ChestPainType, ClinicalInput, Column, ExerciseAngina, FastingBloodSugar, HeartDiseaseClass,
    PredictError, RawClinicalInput, RestingEcg, StSlope, FEATURE_COUNT, PROBABILITY_TOLERANCE,
};
use heartcheck::PredictionDisplay;

const MODELS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models");

fn service() -> PredictionService {
    let bundle = ArtifactBundle::load(Path::new(MODELS)).expect("Shipped artifacts load");
    PredictionService::new(Arc::new(bundle))
}

fn copy_models(to: &Path) {
    for name in [MODEL_FILE, SCALER_FILE, FEATURE_NAMES_FILE] {
        fs::copy(Path::new(MODELS).join(name), to.join(name)).unwrap();
    }
}

fn high_risk() -> ClinicalInput {
    ClinicalInput {
        age: 65.0,
        resting_bp: 160.0,
        cholesterol: 300.0,
        fasting_bs: FastingBloodSugar::Elevated,
        max_hr: 100.0,
        oldpeak: 2.5,
        chest_pain: ChestPainType::Asy,
        resting_ecg: RestingEcg::St,
        exercise_angina: ExerciseAngina::Yes,
        st_slope: StSlope::Flat,
        ..ClinicalInput::sample()
    }
}

#[test]
fn sample_patient_end_to_end() {
    let service = service();
    let input = ClinicalInput::sample();

    let row = service.encode(&input);
    assert_eq!(row.len(), FEATURE_COUNT);
    assert_eq!(row.get(Column::SexM).unwrap(), 1.0);
    assert_eq!(row.get(Column::ChestPainAta).unwrap(), 1.0);
    assert_eq!(row.get(Column::StSlopeUp).unwrap(), 1.0);

    let prediction = service.predict(&input).unwrap();
    let [p0, p1] = prediction.probabilities;
    assert!((p0 + p1 - 1.0).abs() <= PROBABILITY_TOLERANCE);
    assert!((p1 - 0.1187).abs() < 1e-3, "p1 = {p1}");
    assert_eq!(prediction.label, HeartDiseaseClass::NoHeartDisease);

    let json = serde_json::to_value(PredictionDisplay::from(&prediction)).unwrap();
    let map = json.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert!(map.contains_key("No Heart Disease"));
    assert!(map.contains_key("Heart Disease"));
}

#[test]
fn high_risk_patient_is_flagged() {
    let prediction = service().predict(&high_risk()).unwrap();
    assert_eq!(prediction.label, HeartDiseaseClass::HeartDisease);
    assert!(prediction.heart_disease_probability() > 0.9);
}

#[test]
fn label_agrees_with_probabilities() {
    let service = service();
    for age in [25.0, 40.0, 55.0, 70.0, 80.0] {
        for input in [ClinicalInput::sample(), high_risk()] {
            let prediction = service.predict(&ClinicalInput { age, ..input }).unwrap();
            let [p0, p1] = prediction.probabilities;
            assert!((0.0..=1.0).contains(&p0) && (0.0..=1.0).contains(&p1));
            assert_eq!(
                prediction.label,
                HeartDiseaseClass::argmax(prediction.probabilities)
            );
        }
    }
}

#[test]
fn json_request_with_numeric_flag_and_lowercase_labels() {
    let body = r#"{
        "age": 54, "sex": "male", "chest_pain": "ata", "resting_bp": 130,
        "cholesterol": 246, "fasting_bs": 0, "resting_ecg": "normal",
        "max_hr": 150, "exercise_angina": "no", "oldpeak": 1.0, "st_slope": "up"
    }"#;
    let request: RawClinicalInput = serde_json::from_str(body).unwrap();

    let service = service();
    let from_json = service.predict_raw(&request).unwrap();
    let typed = service.predict(&ClinicalInput::sample()).unwrap();
    assert_eq!(from_json, typed);
}

#[test]
fn unknown_category_is_rejected() {
    let mut request = RawClinicalInput::from(&ClinicalInput::sample());
    request.chest_pain = "XYZ".to_string();

    let err = service().predict_raw(&request).unwrap_err();
    assert!(matches!(
        err,
        PredictError::UnknownCategory { field: "chest_pain", .. }
    ));
}

#[test]
fn missing_artifact_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

    match ArtifactBundle::load(dir.path()) {
        Err(ArtifactError::NotFound { path }) => assert!(path.ends_with(SCALER_FILE)),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn truncated_schema_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    fs::write(dir.path().join(FEATURE_NAMES_FILE), "Age,RestingBP").unwrap();

    assert!(matches!(
        ArtifactBundle::load(dir.path()),
        Err(ArtifactError::SchemaMismatch(_))
    ));
}

#[test]
fn manifest_detects_tampering() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());

    ArtifactManifest::generate(dir.path(), &[MODEL_FILE, SCALER_FILE, FEATURE_NAMES_FILE])
        .unwrap()
        .write(dir.path())
        .unwrap();
    assert!(ArtifactBundle::load(dir.path()).is_ok());

    let scaler_path = dir.path().join(SCALER_FILE);
    let tampered = fs::read_to_string(&scaler_path)
        .unwrap()
        .replace("53.5109", "43.5109");
    fs::write(&scaler_path, tampered).unwrap();

    assert!(matches!(
        ArtifactBundle::load(dir.path()),
        Err(ArtifactError::Corrupt { .. })
    ));
}
