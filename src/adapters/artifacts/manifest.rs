//! Optional SHA-256 manifest binding the artifact files.
//!
//! When `manifest.json` is present next to the artifacts, every file it lists
//! must exist and hash to the recorded digest. Without a manifest nothing is
//! checked.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{read_bytes, ArtifactError, MANIFEST_FILE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    #[serde(default)]
    pub version: Option<u32>,
    /// File name -> lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl ArtifactManifest {
    /// Hash `names` inside `dir` into a new manifest.
    ///
    /// # Errors
    /// Returns `ArtifactError::NotFound` for a missing file and
    /// `ArtifactError::Corrupt` for a name that escapes `dir`.
    pub fn generate(dir: &Path, names: &[&str]) -> Result<Self, ArtifactError> {
        let mut files = BTreeMap::new();
        for name in names {
            if !is_plain_relative(name) {
                return Err(ArtifactError::Corrupt {
                    path: dir.join(name),
                    reason: "file name escapes the model directory".into(),
                });
            }
            let bytes = read_bytes(&dir.join(name))?;
            files.insert((*name).to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: Some(1),
            files,
        })
    }

    /// Write the manifest as pretty JSON to `dir/manifest.json`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Corrupt` if the file cannot be written.
    pub fn write(&self, dir: &Path) -> Result<std::path::PathBuf, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| ArtifactError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, bytes).map_err(|e| ArtifactError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

fn is_plain_relative(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Verify the manifest in `dir`, if there is one.
///
/// Returns `Ok(false)` when no manifest exists.
///
/// # Errors
/// Returns `ArtifactError::Corrupt` on an unreadable manifest, a path that
/// escapes the directory or a digest mismatch, and `ArtifactError::NotFound`
/// for a listed file that does not exist.
pub fn verify(dir: &Path) -> Result<bool, ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(false);
    }

    let content = fs::read(&manifest_path).map_err(|e| ArtifactError::Corrupt {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;
    let manifest: ArtifactManifest =
        serde_json::from_slice(&content).map_err(|e| ArtifactError::Corrupt {
            path: manifest_path.clone(),
            reason: format!("invalid manifest format: {e}"),
        })?;

    if manifest.files.is_empty() {
        return Err(ArtifactError::Corrupt {
            path: manifest_path,
            reason: "manifest lists no files".into(),
        });
    }

    for (name, expected) in &manifest.files {
        if !is_plain_relative(name) {
            return Err(ArtifactError::Corrupt {
                path: manifest_path.clone(),
                reason: format!("manifest entry {name:?} escapes the model directory"),
            });
        }

        let path = dir.join(name);
        let bytes = read_bytes(&path)?;
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ArtifactError::Corrupt {
                path,
                reason: "SHA-256 digest does not match manifest.json".into(),
            });
        }
    }

    tracing::info!(
        "Verified {} artifact digests against {:?}",
        manifest.files.len(),
        manifest_path
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_plain_relative_names() {
        assert!(is_plain_relative("scaler.json"));
        assert!(!is_plain_relative("../scaler.json"));
        assert!(!is_plain_relative("/etc/passwd"));
        assert!(!is_plain_relative(""));
    }

    #[test]
    fn test_missing_manifest_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!verify(dir.path()).unwrap());
    }

    #[test]
    fn test_digest_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scaler.json"), b"{}").unwrap();

        let good = format!(r#"{{"files": {{"scaler.json": "{}"}}}}"#, sha256_hex(b"{}"));
        fs::write(dir.path().join(MANIFEST_FILE), good).unwrap();
        assert!(verify(dir.path()).unwrap());

        fs::write(dir.path().join("scaler.json"), b"{ }").unwrap();
        assert!(matches!(
            verify(dir.path()),
            Err(ArtifactError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_generated_manifest_verifies() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scaler.json"), b"{}").unwrap();
        fs::write(dir.path().join("feature_names.txt"), b"Age").unwrap();

        let manifest =
            ArtifactManifest::generate(dir.path(), &["scaler.json", "feature_names.txt"]).unwrap();
        assert_eq!(manifest.files.len(), 2);
        manifest.write(dir.path()).unwrap();
        assert!(verify(dir.path()).unwrap());

        assert!(matches!(
            ArtifactManifest::generate(dir.path(), &["missing.json"]),
            Err(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_escaping_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"files": {"../secret": "00"}}"#,
        )
        .unwrap();
        assert!(matches!(
            verify(dir.path()),
            Err(ArtifactError::Corrupt { .. })
        ));
    }
}
