//! Error types for the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid config {path}: {message}")]
    InvalidConfig { path: String, message: String },

    #[error("Unsupported config format '{0}' (expected .toml, .yaml, .yml or .json)")]
    UnsupportedConfigFormat(String),

    #[error("Module not found: no directory named '{0}'")]
    ModuleNotFound(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Discovery error: {0}")]
    Discovery(#[from] ossa_discovery::DiscoveryError),

    #[error("Policy error: {0}")]
    Policy(#[from] ossa_policy::PolicyError),

    #[error("Registry error: {0}")]
    Registry(#[from] ossa_registry::RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid_config(path: &std::path::Path, message: impl ToString) -> Self {
        CoreError::InvalidConfig {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}
