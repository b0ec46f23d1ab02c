//! Errors for `astrid-events`.

use thiserror::Error;

/// Errors raised routing inbound messages or fanning out outbound ones.
#[derive(Debug, Error)]
pub enum EventsError {
    /// The underlying state store failed.
    #[error(transparent)]
    Storage(#[from] astrid_storage::StorageError),
}

/// Result type for `astrid-events` operations.
pub type EventsResult<T> = Result<T, EventsError>;
