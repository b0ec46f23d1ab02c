//! Storage error types.

use thiserror::Error;

/// Errors from state store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Connecting to the embedded database failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query against the database failed.
    #[error("query error: {0}")]
    Query(#[from] surrealdb::Error),

    /// Serialization or deserialization of a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A key, id, or folder slug was malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for `astrid-storage` operations.
pub type StorageResult<T> = Result<T, StorageError>;
