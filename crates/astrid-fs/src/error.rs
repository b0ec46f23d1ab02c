//! Errors for `astrid-fs`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by atomic file helpers and directory watchers.
#[derive(Debug, Error)]
pub enum FsError {
    /// Underlying I/O failure, with the path that triggered it.
    #[error("io error at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization failed.
    #[error("serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    /// JSON deserialization failed.
    #[error("deserialize error at {path}: {source}")]
    Deserialize {
        /// The path being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The filesystem watcher could not be initialized.
    #[error("watcher init failed: {0}")]
    WatcherInit(String),
}

/// Result type for `astrid-fs` operations.
pub type FsResult<T> = Result<T, FsError>;
