//! Scheduled work entities (§3 `ScheduledTask`, `HostJob`).

use serde::{Deserialize, Serialize};

use crate::ids::WorkspaceFolder;
use crate::timestamp::Timestamp;

/// Cron or fixed-interval schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Standard 5-field cron syntax.
    Cron,
    /// Fixed interval, `schedule_value` holds whole seconds.
    Interval,
}

/// Whether a scheduled agent task resumes the workspace's warm session or
/// starts fresh each fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Reuse the workspace's existing session if one is alive.
    Resume,
    /// Always start an isolated turn with no prior context.
    Isolated,
}

/// Lifecycle state of a scheduled task or host job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Fires on schedule.
    Active,
    /// Schedule is suspended; `next_run` is not advanced.
    Paused,
    /// Terminal — will never fire again.
    Completed,
}

/// An agent cron job (§3 `ScheduledTask`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique id.
    pub id: String,
    /// Owning workspace.
    pub workspace_folder: WorkspaceFolder,
    /// Chat the task's output should be delivered to.
    pub chat_id: String,
    /// The prompt enqueued on fire.
    pub prompt: String,
    /// Cron or interval.
    pub schedule_kind: ScheduleKind,
    /// Cron string, or integer seconds for `Interval`.
    pub schedule_value: String,
    /// Resume vs isolated execution context.
    pub context_mode: ContextMode,
    /// Next scheduled fire time.
    pub next_run: Timestamp,
    /// Last time this task fired, if ever.
    pub last_run: Option<Timestamp>,
    /// Current lifecycle state.
    pub status: TaskStatus,
}

/// A non-agent scheduled host-side shell command (§3 `HostJob`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostJob {
    /// Unique id.
    pub id: String,
    /// Owning workspace (for attribution/audit; execution is host-side).
    pub workspace_folder: WorkspaceFolder,
    /// The shell command to run.
    pub command: String,
    /// Cron or interval.
    pub schedule_kind: ScheduleKind,
    /// Cron string, or integer seconds for `Interval`.
    pub schedule_value: String,
    /// Next scheduled fire time.
    pub next_run: Timestamp,
    /// Last time this job ran, if ever.
    pub last_run: Option<Timestamp>,
    /// Bound on the command's execution time.
    pub timeout_seconds: u64,
    /// Whether the job is currently eligible to fire.
    pub enabled: bool,
}
