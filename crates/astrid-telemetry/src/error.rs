//! Telemetry error types.

use thiserror::Error;

/// Errors raised while configuring or installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A filter directive or other setting was malformed.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The subscriber could not be installed (most commonly: one already
    /// is).
    #[error("initialization error: {0}")]
    InitError(String),

    /// The file appender's target directory could not be prepared.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for `astrid-telemetry` operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
