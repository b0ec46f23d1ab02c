//! Errors for `astrid-audit`.

use thiserror::Error;

/// Errors raised while recording or reading the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The underlying filesystem helper failed.
    #[error(transparent)]
    Fs(#[from] astrid_fs::FsError),
    /// A stored event failed to parse.
    #[error("corrupt audit record at {path}: {source}")]
    Corrupt {
        /// Path of the offending file.
        path: std::path::PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for `astrid-audit` operations.
pub type AuditResult<T> = Result<T, AuditError>;
