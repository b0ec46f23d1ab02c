//! The scheduler tick loop (§4.H), grounded in the original host's
//! `state/host_jobs.get_due_host_jobs`/`update_host_job_after_run` shape
//! (a plain "select where due, run, advance" sweep) extended here to cover
//! agent tasks as well as host jobs.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use astrid_config::SchedulerConfig;
use astrid_core::{ContextMode, HostJob, ScheduledTask, TaskStatus, Timestamp};
use astrid_runtime::SessionManager;
use astrid_security::Cop;
use astrid_runtime::WorkerSpawner;
use astrid_storage::{ScheduleStore, WorkspaceStore};
use tokio::process::Command;
use tracing::{info, warn};

use crate::clock::{next_run_after, resolve_timezone};
use crate::error::SchedulerResult;

/// Runs the tick loop for every active [`ScheduledTask`] and [`HostJob`].
pub struct Scheduler<C: Cop + 'static, S: WorkerSpawner + 'static> {
    schedule: ScheduleStore,
    workspaces: WorkspaceStore,
    sessions: Arc<SessionManager<C, S>>,
    config: SchedulerConfig,
}

impl<C: Cop + 'static, S: WorkerSpawner + 'static> Scheduler<C, S> {
    /// Build a scheduler over the given stores and session manager.
    #[must_use]
    pub fn new(schedule: ScheduleStore, workspaces: WorkspaceStore, sessions: Arc<SessionManager<C, S>>, config: SchedulerConfig) -> Self {
        Self { schedule, workspaces, sessions, config }
    }

    /// Run the tick loop forever. The first tick runs immediately, so any
    /// work that missed its fire window while the host was down coalesces
    /// into a single fire on startup (§4.H point 4) — the second and
    /// later ticks then resume from whatever `now` is at that point.
    pub async fn run(self: Arc<Self>) {
        loop {
            if let Err(e) = self.tick().await {
                warn!(error = %e, "scheduler tick failed");
            }
            tokio::time::sleep(Duration::from_secs(self.config.tick_seconds)).await;
        }
    }

    /// Run one sweep: every due task and job fires at most once, and has
    /// its `next_run` advanced regardless of whether it ran or slipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule store can't be read. Failures
    /// scoped to a single task/job are logged and do not abort the sweep.
    pub async fn tick(&self) -> SchedulerResult<()> {
        let tz = resolve_timezone(self.config.timezone_override.as_deref())?;
        let now = Timestamp::now();

        for task in self.schedule.due_tasks(&now).await? {
            if let Err(e) = self.fire_task(&task, &now, tz).await {
                warn!(task_id = %task.id, error = %e, "scheduled task tick failed");
            }
        }
        for job in self.schedule.due_jobs(&now).await? {
            if let Err(e) = self.fire_job(&job, &now, tz).await {
                warn!(job_id = %job.id, error = %e, "host job tick failed");
            }
        }
        Ok(())
    }

    async fn fire_task(&self, task: &ScheduledTask, now: &Timestamp, tz: chrono_tz::Tz) -> SchedulerResult<()> {
        let next_run = next_run_after(task.schedule_kind, &task.schedule_value, now, tz)?;

        if self.sessions.is_active(&task.workspace_folder) {
            info!(task_id = %task.id, workspace = %task.workspace_folder, "workspace busy, slipping to next tick");
            return Ok(());
        }

        let Some(workspace) = self.workspaces.find_by_folder(&task.workspace_folder.0).await? else {
            warn!(task_id = %task.id, workspace = %task.workspace_folder, "scheduled task's workspace no longer exists, pausing it");
            self.schedule.mark_task_run(&task.id, next_run, TaskStatus::Paused).await?;
            return Ok(());
        };

        if task.context_mode == ContextMode::Isolated {
            self.sessions.stop(&task.workspace_folder).await?;
        }
        self.sessions.enqueue(&workspace, &task.chat_id, task.prompt.clone()).await?;
        info!(task_id = %task.id, workspace = %task.workspace_folder, "scheduled task fired");

        self.schedule.mark_task_run(&task.id, next_run, TaskStatus::Active).await?;
        Ok(())
    }

    async fn fire_job(&self, job: &HostJob, now: &Timestamp, tz: chrono_tz::Tz) -> SchedulerResult<()> {
        let next_run = next_run_after(job.schedule_kind, &job.schedule_value, now, tz)?;
        let timeout = Duration::from_secs(job.timeout_seconds.min(self.config.max_host_job_timeout_seconds).max(1));

        let mut command = Command::new("sh");
        command.arg("-c").arg(&job.command).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                info!(job_id = %job.id, "host job completed");
            },
            Ok(Ok(output)) => {
                warn!(
                    job_id = %job.id,
                    exit_code = output.status.code().unwrap_or(-1),
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "host job exited non-zero, job stays enabled"
                );
            },
            Ok(Err(e)) => warn!(job_id = %job.id, error = %e, "host job failed to launch"),
            Err(_) => warn!(job_id = %job.id, timeout_seconds = timeout.as_secs(), "host job timed out"),
        }

        self.schedule.mark_job_run(&job.id, next_run).await?;
        Ok(())
    }
}
