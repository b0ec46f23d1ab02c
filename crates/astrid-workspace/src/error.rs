//! Errors for `astrid-workspace`.

use thiserror::Error;

/// Errors raised validating workspace folder slugs or resolving layout paths.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A folder slug contains a path separator, `..`, or is otherwise unsafe
    /// to use as a single path component under the data root.
    #[error("unsafe workspace folder slug: {0:?}")]
    UnsafeFolder(String),

    /// A folder slug is empty.
    #[error("workspace folder slug must not be empty")]
    EmptyFolder,
}

/// Result type for `astrid-workspace` operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
