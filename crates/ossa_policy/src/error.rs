//! Error types for policy validation.

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while configuring or reporting validation.
///
/// Validating a manifest never fails; these only cover bad scoring
/// configuration and serialization of results.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Invalid scoring configuration: {0}")]
    InvalidWeights(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
