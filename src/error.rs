//! Error types shared by the validator and the extraction gateways.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single parameter of a method entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDefect {
    NotARecord,
    MissingName,
    MissingType,
}

impl std::fmt::Display for ParameterDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterDefect::NotARecord => f.write_str("not an object"),
            ParameterDefect::MissingName => f.write_str("missing name"),
            ParameterDefect::MissingType => f.write_str("missing type"),
        }
    }
}

/// First shape violation found in one entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid parameter {index}: {defect}")]
    InvalidParameter { index: usize, defect: ParameterDefect },

    #[error("unknown kind {0}")]
    UnknownKind(String),
}

/// First failure found while validating a whole document.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input is not a JSON object mapping names to arrays.
    #[error("malformed IR document")]
    Decode(#[from] serde_json::Error),

    #[error("{interface}: invalid entry at index {index}")]
    InvalidEntry { interface: String, index: usize },

    /// Carries the reason in its own message; it is not chained as a source.
    #[error("{interface}: {reason}")]
    Entry { interface: String, index: usize, reason: EntryError },
}

impl ValidationError {
    /// The entry-level reason, when the failure came from a specific entry.
    pub fn entry_error(&self) -> Option<&EntryError> {
        match self {
            ValidationError::Entry { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn interface(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidEntry { interface, .. } | ValidationError::Entry { interface, .. } => {
                Some(interface)
            }
            ValidationError::Decode(_) => None,
        }
    }
}

/// Failure of an extraction gateway.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction script exited with {status}: {stderr}")]
    Failed { status: std::process::ExitStatus, stderr: String },

    #[error("extraction output is not valid JSON")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
