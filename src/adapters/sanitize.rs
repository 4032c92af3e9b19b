//! Log sanitization: keeps clinical measurements out of log files.
//!
//! Formatted log lines are scanned for:
//! - clinical fields with a value (`age=54`, `"cholesterol": 246`)
//! - feature row columns with a value (`Sex_M: 1`)
//! - predicted probabilities
//! - e-mail addresses and medical record numbers
//!
//! The primary protection is that the pipeline never logs values in the first
//! place; this writer catches the cases where one slips through.
//!
//! # Performance
//!
//! Each line is capped at a byte limit (`Config::sanitize_max_bytes`) and
//! only runs the replacement regexes that matched in a single `RegexSet` pass.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<SanitizePatterns> = OnceLock::new();

/// Default per-line input cap: 16 KiB.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const REDACTED_VALUE: &str = "${1}${2}[REDACTED]";

struct SanitizePattern {
    regex: Regex,
    replacement: &'static str,
}

struct SanitizePatterns {
    set: RegexSet,
    patterns: Vec<SanitizePattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn get_patterns() -> &'static SanitizePatterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Request fields, snake_case or spaced, optionally JSON-quoted.
            (
                r#"(?i)\b(age|sex|chest[_ ]?pain(?:[_ ]?type)?|resting[_ ]?bp|cholesterol|fasting[_ ]?bs|resting[_ ]?ecg|max[_ ]?hr|exercise[_ ]?angina|oldpeak|st[_ ]?slope)\b("?\s*[:=]\s*)("[^"]*"|[A-Za-z0-9.+-]+)"#,
                REDACTED_VALUE,
            ),
            // Encoded feature columns.
            (
                r#"\b(Sex_M|ChestPainType_[A-Z]+|RestingECG_[A-Za-z]+|ExerciseAngina_Y|ST_Slope_[A-Za-z]+|RestingBP|FastingBS|MaxHR)\b("?\s*[:=]\s*)(-?[0-9][0-9.eE+-]*)"#,
                REDACTED_VALUE,
            ),
            // Probabilities, scalar or pair.
            (
                r#"(?i)\b(probabilit(?:y|ies)|p_?heart_?disease|p0|p1)\b("?\s*[:=]\s*)(\[[^\]]*\]|-?[0-9][0-9.eE+-]*)"#,
                REDACTED_VALUE,
            ),
            (
                r#"(?i)("(?:no )?heart disease")(\s*:\s*)(-?[0-9][0-9.eE+-]*)"#,
                REDACTED_VALUE,
            ),
            // MRN patterns (common formats)
            (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = rules
            .into_iter()
            .map(|(pattern, replacement)| SanitizePattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        SanitizePatterns { set, patterns }
    })
}

/// Replace clinical values and PII in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, DEFAULT_SANITIZE_MAX_BYTES)
}

/// Like [`sanitize`], truncating `input` to `max_bytes` first.
#[must_use]
pub fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let pattern = &patterns.patterns[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted log
/// line before it reaches the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_limit(inner, DEFAULT_SANITIZE_MAX_BYTES)
    }

    /// Wrap `inner`, truncating each sanitized line to `max_bytes`.
    #[must_use]
    pub fn with_limit(inner: M, max_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes: max_bytes.max(1),
        }
    }
}

impl<M: Clone> Clone for SanitizingMakeWriter<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W, max_bytes: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            max_bytes,
        }
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = sanitize_with_limit(&String::from_utf8_lossy(&line), self.max_bytes);
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }

    fn flush_remainder(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let sanitized =
                sanitize_with_limit(&String::from_utf8_lossy(&self.buffer), self.max_bytes);
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single huge line without newlines is flushed rather than buffered forever.
        let hard_cap = self.max_bytes.saturating_mul(2);
        if self.buffer.len() > hard_cap {
            self.flush_remainder()?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        self.flush_remainder()?;
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush_remainder();
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer(), self.max_bytes)
    }
}
