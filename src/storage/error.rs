//! Storage-specific error types.

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database operation failed (sqlx error).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid data in database (e.g., out-of-range timestamp).
    #[error("invalid data: {0}")]
    InvalidData(String),
}
