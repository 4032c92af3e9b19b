//! Runtime configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `HEARTCHECK_MODEL_PATH` | `models` |
//! | `HEARTCHECK_LOG_MODE` | `auto` (`file` when stdout is a terminal, else `stdout`) |
//! | `HEARTCHECK_LOG_FILE` | `heartcheck.log` |
//! | `HEARTCHECK_SANITIZE_MAX_BYTES` | `16384` (per log line, before redaction) |
//!
//! The log filter itself comes from `RUST_LOG` (default `info`).

use std::path::PathBuf;

use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;

pub const MODEL_PATH_ENV: &str = "HEARTCHECK_MODEL_PATH";
pub const LOG_MODE_ENV: &str = "HEARTCHECK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEARTCHECK_LOG_FILE";
pub const SANITIZE_MAX_BYTES_ENV: &str = "HEARTCHECK_SANITIZE_MAX_BYTES";

const DEFAULT_MODEL_PATH: &str = "models";
const DEFAULT_LOG_FILE: &str = "heartcheck.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when attached to a terminal (the TUI owns the screen), stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Parse a mode name; anything unrecognised means `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file, given whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the model artifacts
    pub model_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Longest log line the sanitizer processes; the rest is cut off
    pub sanitize_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            model_path: non_empty(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            sanitize_max_bytes: non_empty(SANITIZE_MAX_BYTES_ENV)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.sanitize_max_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.model_path, PathBuf::from("models"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (MODEL_PATH_ENV, "/opt/models"),
            (LOG_MODE_ENV, "STDOUT"),
            (LOG_FILE_ENV, ""),
            (SANITIZE_MAX_BYTES_ENV, "4096"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.model_path, PathBuf::from("/opt/models"));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.log_file, PathBuf::from("heartcheck.log"));
        assert_eq!(config.sanitize_max_bytes, 4096);
    }

    #[test]
    fn test_bad_sanitize_limit_falls_back() {
        for bad in ["0", "-5", "lots"] {
            let config =
                Config::from_lookup(|k| (k == SANITIZE_MAX_BYTES_ENV).then(|| bad.to_string()));
            assert_eq!(config.sanitize_max_bytes, DEFAULT_SANITIZE_MAX_BYTES);
        }
    }

    #[test]
    fn test_log_mode() {
        assert_eq!(LogMode::parse("file"), LogMode::File);
        assert_eq!(LogMode::parse("bogus"), LogMode::Auto);
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
    }
}
