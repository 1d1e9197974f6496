//! Structured error types shared across mcvol crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload shared by every [`VolError`] family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case code, stable across releases.
    pub code: String,
    /// Diagnostic for humans.
    pub message: String,
    /// Offending values keyed by name, e.g. `domain_id` or `path`.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// How to fix the input, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with empty context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records one offending value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for volume calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VolError {
    /// Rejected calculation settings; raised before any point is drawn.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Malformed cells or regions.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Unknown materials or invalid densities.
    #[error("material error: {0}")]
    Material(ErrorInfo),
    /// Results that cannot be merged.
    #[error("combine error: {0}")]
    Combine(ErrorInfo),
    /// Reading, writing or decoding files.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.code)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " {{{key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("}")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl VolError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            VolError::Config(info)
            | VolError::Geometry(info)
            | VolError::Material(info)
            | VolError::Combine(info)
            | VolError::Serde(info) => info,
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        VolError::Config(ErrorInfo::new(code, message))
    }

    /// Wraps an I/O or parse failure tied to a filesystem path.
    pub fn io(code: &str, err: impl ToString, path: impl fmt::Display) -> Self {
        VolError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path))
    }
}
