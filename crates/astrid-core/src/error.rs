//! Shared error type for domain-level operations.

use thiserror::Error;

/// Errors produced by `astrid-core` domain types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed validation (e.g. an empty workspace folder slug).
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Result type for `astrid-core` operations.
pub type CoreResult<T> = Result<T, CoreError>;
