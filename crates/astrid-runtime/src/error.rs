//! Errors for `astrid-runtime`.

use thiserror::Error;

/// Errors raised spawning, delivering to, or stopping a worker session, or
/// routing a `tasks/` request.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The IPC fabric failed to read or write.
    #[error(transparent)]
    Ipc(#[from] astrid_ipc::IpcError),

    /// The workspace's folder slug could not be resolved to a path.
    #[error(transparent)]
    Workspace(#[from] astrid_workspace::WorkspaceError),

    /// The security gate or Cop failed.
    #[error(transparent)]
    Security(#[from] astrid_security::SecurityError),

    /// The pending-approval or pending-question store failed.
    #[error(transparent)]
    Approval(#[from] astrid_approval::ApprovalError),

    /// The durable state store failed.
    #[error(transparent)]
    Storage(#[from] astrid_storage::StorageError),

    /// Spawning the worker process itself failed (the configured command
    /// could not be launched).
    #[error("failed to spawn worker for workspace {workspace}: {source}")]
    Spawn {
        /// The workspace the spawn was for.
        workspace: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// No live session exists for the workspace, and the caller asked for
    /// an operation that requires one (e.g. `deliver` without
    /// `get_or_spawn`).
    #[error("no live worker session for workspace {0}")]
    NoSuchSession(String),

    /// The worker process was killed or exited before the operation could
    /// complete.
    #[error("worker for workspace {0} crashed or exited")]
    Crashed(String),
}

/// Result type for `astrid-runtime` operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
