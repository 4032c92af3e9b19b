//! JSON front-end: one prediction request per invocation.
//!
//! # Usage
//!
//! ```bash
//! echo '{"age": 54, "sex": "Male", "chest_pain": "ATA", "resting_bp": 130,
//!        "cholesterol": 246, "fasting_bs": 0, "resting_ecg": "Normal",
//!        "max_hr": 150, "exercise_angina": "No", "oldpeak": 1.0,
//!        "st_slope": "Up"}' | cargo run --bin predict_json
//! ```
//!
//! Prints `{"No Heart Disease": p0, "Heart Disease": p1}` on success.
//!
//! # Exit status
//!
//! - `0`: prediction printed
//! - `1`: artifacts could not be loaded
//! - `2`: the request was rejected; `{"error": kind, "message": ...}` is printed

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartcheck::adapters::artifacts::ArtifactBundle;
use heartcheck::adapters::sanitize::SanitizingMakeWriter;
use heartcheck::application::PredictionService;
use heartcheck::config::Config;
use heartcheck::domain::{PredictError, RawClinicalInput};
use heartcheck::{HeartcheckError, PredictionDisplay, Result};

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    remediation: &'a str,
}

enum Outcome {
    Predicted(PredictionDisplay),
    Rejected(PredictError),
}

fn run(config: &Config) -> Result<Outcome> {
    let bundle = ArtifactBundle::load(&config.model_path)?;
    let service = PredictionService::new(Arc::new(bundle));

    let mut body = String::new();
    std::io::stdin().read_to_string(&mut body)?;

    // A body that is not a request object is rejected like any other bad input.
    let request: RawClinicalInput = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return Ok(Outcome::Rejected(PredictError::InvalidInput {
                errors: vec![format!("malformed request: {e}")],
            }))
        }
    };

    match service.predict_raw(&request) {
        Ok(prediction) => Ok(Outcome::Predicted(PredictionDisplay::from(&prediction))),
        Err(e) => Ok(Outcome::Rejected(e)),
    }
}

fn respond(outcome: &Outcome) -> Result<(String, ExitCode)> {
    match outcome {
        Outcome::Predicted(display) => Ok((serde_json::to_string(display)?, ExitCode::SUCCESS)),
        Outcome::Rejected(e) => {
            let body = ErrorBody {
                error: e.kind(),
                message: e.to_string(),
                remediation: e.remediation(),
            };
            Ok((serde_json::to_string(&body)?, ExitCode::from(2)))
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    // stdout carries the response, so logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::with_limit(
                    std::io::stderr,
                    config.sanitize_max_bytes,
                )),
        )
        .init();

    match run(&config).and_then(|outcome| respond(&outcome)) {
        Ok((json, code)) => {
            println!("{json}");
            code
        }
        Err(e @ HeartcheckError::Artifact(_)) => {
            eprintln!("Error: {e} (model directory {:?})", config.model_path);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
