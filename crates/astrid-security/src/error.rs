//! Errors for `astrid-security`.

use thiserror::Error;

/// Errors raised by the gate, scanner, or Cop.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// No gate is registered for the given `(workspace_folder,
    /// invocation_ts)` key — the worker invocation never registered one,
    /// or it was already released.
    #[error("no gate registered for invocation {0}")]
    NoSuchGate(String),

    /// A secrets-scanner pattern failed to compile. Indicates a bug in the
    /// pattern table, not a runtime condition.
    #[error("invalid scanner pattern {name}: {source}")]
    InvalidPattern {
        /// Name of the offending pattern.
        name: &'static str,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The Cop backend returned something that doesn't parse as its strict
    /// JSON verdict contract. Callers should treat this the same as a
    /// transport failure (fail open).
    #[error("cop response did not match the verdict contract: {0}")]
    CopContractViolation(String),

    /// Transport failure calling the Cop backend.
    #[error("cop transport error: {0}")]
    CopTransport(String),
}

/// Result type for `astrid-security` operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
