//! Errors for `astrid-ipc`.

use thiserror::Error;

/// Errors raised operating the file-backed IPC fabric.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Filesystem layer failure (create/read/write/rename).
    #[error(transparent)]
    Fs(#[from] astrid_fs::FsError),

    /// A workspace folder slug could not be resolved to a path.
    #[error(transparent)]
    Workspace(#[from] astrid_workspace::WorkspaceError),

    /// A file under the fabric's directories failed to parse as the
    /// expected JSON shape.
    #[error("malformed ipc file {path}: {source}")]
    Malformed {
        /// The offending file.
        path: String,
        /// The underlying parse failure.
        source: serde_json::Error,
    },

    /// A `tasks/` entry was missing a required `type` or `request_id` field.
    #[error("task file {path} is missing required field {field}")]
    MissingField {
        /// The offending file.
        path: String,
        /// The missing field's name.
        field: &'static str,
    },

    /// A `tasks/` entry's `request_id` field did not parse as a UUID.
    #[error("task file {path} has an invalid request_id {value:?}")]
    InvalidRequestId {
        /// The offending file.
        path: String,
        /// The unparsable value.
        value: String,
    },
}

/// Result type for `astrid-ipc` operations.
pub type IpcResult<T> = Result<T, IpcError>;
