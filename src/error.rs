//! Error types for loading schemas and running the checker
//!
//! The comparison engine itself is infallible; these errors cover the
//! surrounding plumbing (locating files, decoding trees, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for proto-compat operations
pub type Result<T> = std::result::Result<T, CompatError>;

/// Errors raised outside the comparison engine
#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Schema not found: {path} (searched {searched:?})")]
    NotFound { path: PathBuf, searched: Vec<PathBuf> },

    #[error("Invalid schema location: {0}")]
    InvalidLocation(String),

    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
