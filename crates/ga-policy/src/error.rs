// error.rs — Error types for policy configuration.

use thiserror::Error;

/// Errors that can occur loading or validating governance configuration.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A config file could not be parsed.
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
