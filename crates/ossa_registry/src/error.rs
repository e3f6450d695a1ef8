//! Error types for the agent registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by the registry.
///
/// Persistence failures during `update` and `get` are logged, not returned;
/// only explicit calls such as `flush` report them.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("Cache file error at {path}: {message}")]
    Persist { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
