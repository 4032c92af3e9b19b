//! Artifact adapter: loads the classifier, the scaler and the feature schema.
//!
//! The three files are produced by the training notebook and read exactly
//! once at start-up:
//! - `heart_disease_model.json`: classifier (see [`ClassifierArtifact`])
//! - `scaler.json`: scaling transform for the continuous columns
//! - `feature_names.txt`: comma separated column order
//!
//! # Consistency
//!
//! The three files are fitted together. After loading, the bundle checks that
//! the schema, the scaler and the classifier agree on width and, where the
//! artifacts record column names, on order. A bundle that fails the check is
//! never handed out.

mod classifier;
mod manifest;
mod scaler;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use classifier::{ClassifierArtifact, DecisionTree, LogisticRegression, RandomForest};
pub use manifest::ArtifactManifest;
pub use scaler::ScalerArtifact;

use crate::domain::{Column, FeatureSchema, SchemaError};
use crate::ports::{Classifier, Scaler};

pub const MODEL_FILE: &str = "heart_disease_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.txt";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Error type for artifact loading. All variants are fatal at start-up.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Artifact {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Artifacts do not match each other: {0}")]
    SchemaMismatch(String),
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}

fn read_text(path: &Path) -> Result<String, ArtifactError> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes).map_err(|_| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: "not valid UTF-8".into(),
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Immutable classifier, scaler and schema, shared for the process lifetime.
pub struct ArtifactBundle {
    classifier: Box<dyn Classifier>,
    scaler: Box<dyn Scaler>,
    schema: FeatureSchema,
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("schema", &self.schema.names())
            .field("scaler_features", &self.scaler.n_features())
            .field("classifier_features", &self.classifier.n_features())
            .finish()
    }
}

impl ArtifactBundle {
    /// Load the three artifacts from `dir`.
    ///
    /// If `manifest.json` is present, file digests are verified first.
    ///
    /// # Errors
    /// - `ArtifactError::NotFound` if any of the three files is missing
    /// - `ArtifactError::Corrupt` if a file cannot be parsed
    /// - `ArtifactError::SchemaMismatch` if the artifacts disagree
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        Self::load_with(dir, true)
    }

    /// Load the three artifacts without consulting `manifest.json`.
    ///
    /// Used when the manifest itself is about to be regenerated.
    ///
    /// # Errors
    /// Same as [`ArtifactBundle::load`], minus digest mismatches.
    pub fn load_unverified(dir: &Path) -> Result<Self, ArtifactError> {
        Self::load_with(dir, false)
    }

    fn load_with(dir: &Path, verify_manifest: bool) -> Result<Self, ArtifactError> {
        let model_path = dir.join(MODEL_FILE);
        let scaler_path = dir.join(SCALER_FILE);
        let schema_path = dir.join(FEATURE_NAMES_FILE);

        // Report a missing file before trying to parse anything.
        for path in [&model_path, &scaler_path, &schema_path] {
            if !path.is_file() {
                tracing::error!("Required artifact missing: {:?}", path);
                return Err(ArtifactError::NotFound { path: path.clone() });
            }
        }

        if verify_manifest {
            manifest::verify(dir)?;
        }

        let classifier: ClassifierArtifact = read_json(&model_path)?;
        classifier.validate().map_err(|reason| ArtifactError::Corrupt {
            path: model_path.clone(),
            reason,
        })?;

        let scaler: ScalerArtifact = read_json(&scaler_path)?;
        scaler.validate().map_err(|reason| ArtifactError::Corrupt {
            path: scaler_path.clone(),
            reason,
        })?;

        let schema_text = read_text(&schema_path)?;
        let schema = FeatureSchema::parse(&schema_text).map_err(|e| match e {
            empty @ SchemaError::EmptyName(_) => ArtifactError::Corrupt {
                path: schema_path.clone(),
                reason: empty.to_string(),
            },
            other => ArtifactError::SchemaMismatch(format!("{FEATURE_NAMES_FILE}: {other}")),
        })?;

        let bundle = Self::from_parts(classifier, scaler, schema)?;
        tracing::info!(
            "Loaded artifacts from {:?} ({} columns, {} scaled)",
            dir,
            bundle.schema.len(),
            bundle.scaler.n_features()
        );
        Ok(bundle)
    }

    /// Assemble a bundle from already constructed parts.
    ///
    /// # Errors
    /// Returns `ArtifactError::SchemaMismatch` if the parts disagree.
    pub fn from_parts<C, S>(classifier: C, scaler: S, schema: FeatureSchema) -> Result<Self, ArtifactError>
    where
        C: Classifier + 'static,
        S: Scaler + 'static,
    {
        let bundle = Self {
            classifier: Box::new(classifier),
            scaler: Box::new(scaler),
            schema,
        };
        bundle.check_consistency()?;
        Ok(bundle)
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        let continuous = Column::CONTINUOUS.len();
        if self.scaler.n_features() != continuous {
            return Err(ArtifactError::SchemaMismatch(format!(
                "scaler was fitted on {} columns, expected {continuous}",
                self.scaler.n_features()
            )));
        }
        if let Some(names) = self.scaler.feature_names() {
            let expected = Column::CONTINUOUS.map(Column::name);
            if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "scaler columns {names:?} differ from {expected:?}"
                )));
            }
        }

        if self.classifier.n_features() != self.schema.len() {
            return Err(ArtifactError::SchemaMismatch(format!(
                "classifier was trained on {} columns, {FEATURE_NAMES_FILE} lists {}",
                self.classifier.n_features(),
                self.schema.len()
            )));
        }
        if let Some(names) = self.classifier.feature_names() {
            let expected = self.schema.names();
            if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "classifier column order {names:?} differs from {FEATURE_NAMES_FILE}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    #[must_use]
    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}
