//! Scheduler error types.

use thiserror::Error;

/// Errors raised while computing a fire time or running a tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A stored `schedule_value` is not valid for its `schedule_kind`.
    #[error("invalid schedule `{value}` for {kind:?}: {reason}")]
    InvalidSchedule {
        /// The kind the value was supposed to match.
        kind: astrid_core::ScheduleKind,
        /// The offending raw value.
        value: String,
        /// Why it didn't parse.
        reason: String,
    },

    /// `timezone_override` is not a recognized IANA name.
    #[error("unknown timezone override `{0}`")]
    UnknownTimezone(String),

    /// A cron schedule has no next fire time after `now` (practically
    /// unreachable for standard 5-field cron, but `cron` returns an
    /// `Option` so this is surfaced rather than panicked on).
    #[error("schedule `{0}` has no upcoming fire time")]
    Exhausted(String),

    #[error(transparent)]
    Storage(#[from] astrid_storage::StorageError),

    #[error(transparent)]
    Runtime(#[from] astrid_runtime::RuntimeError),
}

/// Result type for `astrid-scheduler` operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
