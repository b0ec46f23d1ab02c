//! Configuration struct definitions.
//!
//! These mirror the host's ambient configuration surface: where durable
//! state lives, how workspaces default their security posture, how the
//! scheduler paces itself, how long a worker may sit idle, which magic
//! commands the router recognizes, and what the Cop talks to.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level host configuration, as loaded from `config.toml` and overlaid
/// with `ASTRID_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Root directory for IPC, the embedded database, and the audit log.
    pub data_root: PathBuf,
    /// Defaults applied to a workspace that doesn't override them.
    pub workspace: WorkspaceDefaults,
    /// Worker spawn/idle/grace-period tuning.
    pub worker: WorkerConfig,
    /// Scheduler tick cadence and catch-up policy.
    pub scheduler: SchedulerConfig,
    /// Security gate defaults and the Cop backend.
    pub security: SecurityConfig,
    /// Magic-command and router tuning.
    pub commands: CommandsConfig,
    /// Structured logging configuration.
    pub telemetry: TelemetryConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("/var/lib/astrid"),
            workspace: WorkspaceDefaults::default(),
            worker: WorkerConfig::default(),
            scheduler: SchedulerConfig::default(),
            security: SecurityConfig::default(),
            commands: CommandsConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Defaults a newly registered workspace inherits unless it overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceDefaults {
    /// Default trigger pattern for non-admin workspaces.
    pub default_trigger: String,
    /// Whether newly registered workspaces start tainted for secrets.
    pub contains_secrets_by_default: bool,
}

impl Default for WorkspaceDefaults {
    fn default() -> Self {
        Self {
            default_trigger: "!agent".to_string(),
            contains_secrets_by_default: false,
        }
    }
}

/// Worker process lifecycle tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Seconds of inactivity before a warm worker is evicted.
    pub idle_timeout_seconds: u64,
    /// Seconds to wait for graceful `_close` shutdown before SIGTERM.
    pub graceful_stop_seconds: u64,
    /// Seconds to wait after SIGTERM before a forced kill.
    pub force_kill_seconds: u64,
    /// Cap on buffered stderr bytes before truncation.
    pub stderr_buffer_bytes: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: 600,
            graceful_stop_seconds: 10,
            force_kill_seconds: 5,
            stderr_buffer_bytes: 64 * 1024,
        }
    }
}

/// Scheduler tick cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How often the scheduler checks for due work.
    pub tick_seconds: u64,
    /// Bound on a host job's execution time when its own `timeout_seconds`
    /// is unset or exceeds this.
    pub max_host_job_timeout_seconds: u64,
    /// IANA timezone name `next_run` is computed in. `None` means UTC.
    /// Process-wide: every workspace's cron schedule is interpreted in the
    /// same zone (§6).
    pub timezone_override: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 15,
            max_host_job_timeout_seconds: 300,
            timezone_override: None,
        }
    }
}

/// Security gate defaults and Cop backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Seconds a pending approval waits before timing out to a denial.
    pub approval_timeout_seconds: u64,
    /// Seconds a pending question waits before timing out.
    pub question_timeout_seconds: u64,
    /// Whether the Cop is enabled at all; when `false`, every escalation
    /// that would have asked the Cop instead goes straight to
    /// `needs_human`.
    pub cop_enabled: bool,
    /// Model identifier the Cop backend is configured to call.
    pub cop_model: String,
    /// HTTP endpoint the Cop backend POSTs action summaries to. Ignored
    /// when `cop_enabled` is `false`.
    pub cop_endpoint: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            approval_timeout_seconds: 900,
            question_timeout_seconds: 900,
            cop_enabled: true,
            cop_model: "claude-cop".to_string(),
            cop_endpoint: String::new(),
        }
    }
}

/// Magic-command surface (§6) tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Reaction emoji that triggers `interrupt` on a workspace's queue.
    pub interrupt_reaction: String,
    /// Whether `redeploy` is permitted from a chat command at all.
    pub allow_chat_redeploy: bool,
    /// Words that clear session + history.
    pub reset_words: Vec<String>,
    /// Words that stop the worker but keep history.
    pub end_session_words: Vec<String>,
    /// Words that trigger a rebuild-and-restart.
    pub redeploy_words: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            interrupt_reaction: "\u{1f6d1}".to_string(),
            allow_chat_redeploy: true,
            reset_words: vec!["reset".to_string()],
            end_session_words: vec!["end-session".to_string(), "end_session".to_string()],
            redeploy_words: vec!["redeploy".to_string()],
        }
    }
}

/// Structured logging configuration, consumed by `astrid-telemetry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info,astrid=debug"`.
    pub filter: String,
    /// Emit logs as JSON instead of the human-readable format.
    pub json: bool,
    /// Directory for rolling log files; `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}
