//! Error types for Tempbox.

use thiserror::Error;

/// Common error type for Tempbox.
#[derive(Error, Debug)]
pub enum TempboxError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the storage
    /// backend. Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// A record with the same primary key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input or candidate records.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Inbound message could not be parsed as a MIME message.
    #[error("parse error: {0}")]
    Parse(String),

    /// Anti-abuse verification failed. Missing token, invalid token and
    /// verification-service failure all map here.
    #[error("anti-abuse verification failed: {0}")]
    AntiAbuse(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for TempboxError {
    fn from(e: sqlx::Error) -> Self {
        TempboxError::Database(e.to_string())
    }
}

/// Result type alias for Tempbox operations.
pub type Result<T> = std::result::Result<T, TempboxError>;
