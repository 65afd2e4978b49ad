//! Error types for the binscan triage pipeline.
//!
//! Only [`ScanError::TargetUnreadable`] is fatal to an analysis run. Parser and
//! external-tool failures have their own error types and are folded into the
//! report as typed sentinels before they can reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for binscan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The analysis target could not be opened or read
    #[error("Cannot read target {path}: {source}")]
    TargetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration rejected by validation or failed to load
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation exceeded its time budget
    #[error("Operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::Serialization(err.to_string())
    }
}

/// Result type alias for binscan operations
pub type Result<T> = std::result::Result<T, ScanError>;
