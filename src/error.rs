//! Error types for studyflow.

use thiserror::Error;

/// Errors produced anywhere in studyflow.
#[derive(Debug, Error)]
pub enum StudyFlowError {
    /// Local database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A user-supplied value (date, duration, status) could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A record entering the core failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested record does not exist for this user.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StudyFlowError {
    /// Shorthand for an [`StudyFlowError::InvalidInput`] error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<rusqlite::Error> for StudyFlowError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
