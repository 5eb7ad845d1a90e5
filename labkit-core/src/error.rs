//! # Error Module
//!
//! The three failure conditions a lab session can hit. Source failures are
//! fatal at startup; parameter and degenerate-input failures are recovered
//! by the session and surfaced to whatever is rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by loading, parameter updates and derivations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabError {
    /// Input data is missing, unreadable or empty.
    #[error("source unavailable ({}): {reason}", path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    /// A control was set outside its declared domain.
    #[error("invalid value for '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The derivation is numerically undefined for the current inputs.
    #[error("undefined result: {0}")]
    DegenerateInput(String),
}

impl LabError {
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LabError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(name: &str, reason: impl ToString) -> Self {
        LabError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn degenerate(reason: impl ToString) -> Self {
        LabError::DegenerateInput(reason.to_string())
    }

    /// True for conditions the session recovers from by showing an
    /// "undefined" state instead of a result.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, LabError::DegenerateInput(_))
    }
}

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, LabError>;
