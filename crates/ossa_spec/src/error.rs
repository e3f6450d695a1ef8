//! Error types for the spec module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while reading, writing or checking manifests.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Manifest not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported manifest format for file {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid manifest in file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Schema compilation failed: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
