//! Errors for `astrid-approval`.

use thiserror::Error;

/// Errors raised by the pending-approval and pending-question stores.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Underlying filesystem operation failed.
    #[error(transparent)]
    Fs(#[from] astrid_fs::FsError),

    /// A pending file on disk didn't parse as the expected type.
    #[error("corrupt pending record at {path}: {source}")]
    Corrupt {
        /// Path of the offending file.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// No pending record matches the given request id or short id.
    #[error("no pending record for {0}")]
    NotFound(String),

    /// A short-id prefix matched more than one pending record.
    #[error("short id {prefix} is ambiguous: matches {matches:?}")]
    AmbiguousShortId {
        /// The short id that was typed.
        prefix: String,
        /// Full request ids it matched.
        matches: Vec<String>,
    },
}

/// Result type for `astrid-approval` operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
