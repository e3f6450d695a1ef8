//! Error types for discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while setting up or running discovery.
///
/// Per-file and per-detector failures are not errors: they are logged and the
/// scan continues without them.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Discovery root is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid discovery configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown agent format: {0}")]
    UnknownFormat(String),

    #[error("Discovery task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscoveryError {
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }
}

impl From<regex::Error> for DiscoveryError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: String::new(),
            message: e.to_string(),
        }
    }
}
