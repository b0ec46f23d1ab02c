//! Composition-root error type: every sibling crate's error, plus the
//! deploy/lifecycle failures owned by this crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `Host` composition root and its `deploy` module.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Loading or validating `HostConfig` failed.
    #[error(transparent)]
    Config(#[from] astrid_config::ConfigError),

    /// A workspace folder slug failed validation.
    #[error(transparent)]
    Workspace(#[from] astrid_workspace::WorkspaceError),

    /// Reading from or writing to the state store failed.
    #[error(transparent)]
    Storage(#[from] astrid_storage::StorageError),

    /// Security gate construction or evaluation failed.
    #[error(transparent)]
    Security(#[from] astrid_security::SecurityError),

    /// An approval or pending-question operation failed.
    #[error(transparent)]
    Approval(#[from] astrid_approval::ApprovalError),

    /// An audit-log write or read failed.
    #[error(transparent)]
    Audit(#[from] astrid_audit::AuditError),

    /// Routing or bus dispatch failed.
    #[error(transparent)]
    Events(#[from] astrid_events::EventsError),

    /// Worker session management failed.
    #[error(transparent)]
    Runtime(#[from] astrid_runtime::RuntimeError),

    /// IPC fabric access failed.
    #[error(transparent)]
    Ipc(#[from] astrid_ipc::IpcError),

    /// A continuation file or other plain file couldn't be read or written.
    #[error(transparent)]
    Fs(#[from] astrid_fs::FsError),

    /// Telemetry setup failed.
    #[error(transparent)]
    Telemetry(#[from] astrid_telemetry::TelemetryError),

    /// A bare I/O failure not already wrapped by a sibling crate's error
    /// type, e.g. registering a unix signal handler.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The deploy continuation file at `path` exists but is not valid JSON.
    #[error("deploy continuation at {path} is corrupt: {source}")]
    CorruptContinuation {
        /// Path to the offending file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A magic command named a canonical chat id with no matching workspace.
    #[error("no workspace is bound to chat id {0:?}")]
    NoSuchWorkspace(String),

    /// `approve`/`deny` named a short id with no matching pending record.
    #[error("no pending approval or question matches {0:?}")]
    NoSuchPending(String),
}

/// Result type for `astrid-kernel` operations.
pub type KernelResult<T> = Result<T, KernelError>;
