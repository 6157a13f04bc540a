//! Error types for the catalog store.

use std::path::Path;
use thiserror::Error;

/// Catalog store result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Catalog store errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection, query, etc.)
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// IO error (file system operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Target catalog file is already present
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Catalog file or row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data does not fit the catalog model
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DbError {
    /// Create an already-exists error for a catalog path.
    pub fn already_exists(path: &Path) -> Self {
        Self::AlreadyExists(path.display().to_string())
    }

    /// Create a not found error for a catalog path.
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound(path.display().to_string())
    }

    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
