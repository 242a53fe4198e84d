//! Custom error types for the application.
//!
//! This module defines the primary error type, `ExportError`, for the entire
//! pipeline. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of errors that can occur,
//! from I/O and configuration issues to per-sequence dataset problems.
//!
//! ## Error Hierarchy
//!
//! `ExportError` is an enum that consolidates various error sources:
//!
//! - **`Configuration`**: Semantic errors in the configuration, such as a
//!   joint convention that does not cover all 21 slots, or an order name
//!   that is not registered. These are caught before any work is attempted.
//! - **`Io`**: Wraps standard `std::io::Error`, covering file reads and
//!   writes. During an export run a write-side I/O error is fatal.
//! - **`ManifestNotFound` / `UnknownSide`**: Pre-flight failures when
//!   resolving the hand-split manifest.
//! - **`SequenceNotFound` / `CorruptArchive` / `Metadata` / `Archive`**:
//!   Per-sequence failures raised by the sequence loader. The exporter
//!   records these and moves on to the next sequence; they never abort a
//!   run on their own.
//!
//! By using `#[from]`, `ExportError` can be seamlessly created from
//! underlying error types, simplifying error handling throughout the
//! library with the `?` operator. The sequence loader deliberately maps
//! read-side I/O and parse errors into its own per-sequence variants so
//! that everything it returns is recoverable at the exporter level.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record serialization error: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("Hand-split manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Unknown hand side '{0}' (expected 'left' or 'right')")]
    UnknownSide(String),

    #[error("Sequence metadata not found: {0}")]
    SequenceNotFound(PathBuf),

    #[error("Corrupt pose archive for '{sequence}': metadata declares {declared} frames, archive has {actual}")]
    CorruptArchive {
        sequence: String,
        declared: usize,
        actual: usize,
    },

    #[error("Sequence metadata error for '{sequence}': {reason}")]
    Metadata { sequence: String, reason: String },

    #[error("Pose archive error for '{sequence}': {reason}")]
    Archive { sequence: String, reason: String },

    #[error("Unknown YCB object: {0}")]
    UnknownObject(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_archive_message_names_both_counts() {
        let err = ExportError::CorruptArchive {
            sequence: "subject-01/20200709_141754".into(),
            declared: 12,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
        assert!(msg.contains("subject-01/20200709_141754"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
