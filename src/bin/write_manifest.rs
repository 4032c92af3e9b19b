//! Manifest utility for Heartcheck model artifacts.
//!
//! Writes `manifest.json` with the SHA-256 digest of each artifact file, so
//! that a later load refuses files that were modified after export.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use heartcheck::adapters::artifacts::{
    ArtifactBundle, ArtifactManifest, FEATURE_NAMES_FILE, MODEL_FILE, SCALER_FILE,
};

fn usage() -> String {
    "Usage: write_manifest <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        bail!(usage());
    };
    if arg == "-h" || arg == "--help" || args.next().is_some() {
        bail!(usage());
    }

    let model_dir = PathBuf::from(arg);
    if model_dir.is_file() {
        return model_dir
            .parent()
            .map(PathBuf::from)
            .context("Model path has no parent directory");
    }
    Ok(model_dir)
}

fn main() -> Result<()> {
    let model_dir = parse_args()?;

    // Only bind artifacts that actually load together. The old manifest, if
    // any, stays on disk until the new one replaces it.
    ArtifactBundle::load_unverified(&model_dir)
        .with_context(|| format!("Refusing to write a manifest for {model_dir:?}"))?;

    let manifest =
        ArtifactManifest::generate(&model_dir, &[MODEL_FILE, SCALER_FILE, FEATURE_NAMES_FILE])?;
    let path = manifest.write(&model_dir)?;

    println!("Wrote manifest: {path:?}");
    for (name, digest) in &manifest.files {
        println!("  {name}  sha256={digest}");
    }
    Ok(())
}
