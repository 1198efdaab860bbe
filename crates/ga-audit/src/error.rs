// error.rs — Error types for the graduation log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur appending to or verifying the graduation log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The log file could not be opened.
    #[error("failed to open graduation log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A read or write on the open log failed.
    #[error("I/O error on graduation log: {0}")]
    Io(#[from] std::io::Error),

    /// An event could not be serialized/deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The hash chain does not verify — the log may have been tampered with.
    #[error("hash chain broken at line {line}: expected previous_hash {expected}, found {actual}")]
    IntegrityViolation {
        line: usize,
        expected: String,
        actual: String,
    },
}
