use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Bot API errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") || code.as_deref() == Some("23514") {
                    // Foreign key or check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// Errors talking to the Bot API
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `ok: false`
    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
