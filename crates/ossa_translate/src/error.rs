//! Error types for translation.

use ossa_discovery::AgentFormat;
use thiserror::Error;

/// Result type alias for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors that end translation of a single record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("No translator for format '{0}'")]
    UnsupportedFormat(AgentFormat),

    #[error("Record format '{declared}' does not match its '{fragment}' fragment")]
    FormatMismatch {
        declared: AgentFormat,
        fragment: AgentFormat,
    },

    #[error("Translation worker failed: {0}")]
    WorkerFailed(String),
}
