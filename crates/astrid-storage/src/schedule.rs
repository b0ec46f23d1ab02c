//! CRUD for scheduled agent tasks and host jobs (§3 `ScheduledTask`, `HostJob`).

use astrid_core::{HostJob, ScheduledTask, TaskStatus, Timestamp};

use crate::db::Db;
use crate::error::{StorageError, StorageResult};

const TASK_TABLE: &str = "scheduled_task";
const JOB_TABLE: &str = "host_job";

/// Scheduled-work persistence, covering both agent tasks and host jobs.
#[derive(Clone, Debug)]
pub struct ScheduleStore {
    db: Db,
}

impl ScheduleStore {
    /// Wrap `db` for scheduled-work access.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert or replace a scheduled task.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn put_task(&self, task: &ScheduledTask) -> StorageResult<()> {
        let id = task.id.clone();
        let task = task.clone();
        self.db
            .write(move |client| async move {
                let _: Option<ScheduledTask> = client
                    .upsert((TASK_TABLE, id))
                    .content(task)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// Fetch a scheduled task by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_task(&self, id: &str) -> StorageResult<Option<ScheduledTask>> {
        self.db
            .client()
            .select((TASK_TABLE, id.to_string()))
            .await
            .map_err(StorageError::Query)
    }

    /// List every active task due to fire at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn due_tasks(&self, now: &Timestamp) -> StorageResult<Vec<ScheduledTask>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM type::table($table) WHERE status = 'active' AND next_run <= $now ORDER BY next_run ASC",
            )
            .bind(("table", TASK_TABLE))
            .bind(("now", now.as_str().to_string()))
            .await
            .map_err(StorageError::Query)?;
        response.take(0).map_err(StorageError::Query)
    }

    /// Delete a scheduled task. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn delete_task(&self, id: &str) -> StorageResult<()> {
        let id = id.to_string();
        self.db
            .write(move |client| async move {
                let _: Option<ScheduledTask> = client
                    .delete((TASK_TABLE, id))
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// List every scheduled task, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_tasks(&self) -> StorageResult<Vec<ScheduledTask>> {
        self.db
            .client()
            .select(TASK_TABLE)
            .await
            .map_err(StorageError::Query)
    }

    /// Pause, resume, or complete a task and record its last fire time in
    /// one write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the task does not exist, or
    /// propagates a write failure.
    pub async fn mark_task_run(&self, id: &str, next_run: Timestamp, status: TaskStatus) -> StorageResult<()> {
        let id = id.to_string();
        self.db
            .write(move |client| async move {
                let existing: Option<ScheduledTask> = client
                    .select((TASK_TABLE, id.clone()))
                    .await
                    .map_err(StorageError::Query)?;
                let mut task = existing.ok_or_else(|| StorageError::NotFound(format!("scheduled task {id}")))?;
                task.last_run = Some(task.next_run.clone());
                task.next_run = next_run;
                task.status = status;
                let _: Option<ScheduledTask> = client
                    .update((TASK_TABLE, id))
                    .content(task)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// Insert or replace a host job.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn put_job(&self, job: &HostJob) -> StorageResult<()> {
        let id = job.id.clone();
        let job = job.clone();
        self.db
            .write(move |client| async move {
                let _: Option<HostJob> = client
                    .upsert((JOB_TABLE, id))
                    .content(job)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// List every enabled host job due to fire at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn due_jobs(&self, now: &Timestamp) -> StorageResult<Vec<HostJob>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM type::table($table) WHERE enabled = true AND next_run <= $now ORDER BY next_run ASC")
            .bind(("table", JOB_TABLE))
            .bind(("now", now.as_str().to_string()))
            .await
            .map_err(StorageError::Query)?;
        response.take(0).map_err(StorageError::Query)
    }

    /// Record a host job's completion and its next fire time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the job does not exist, or
    /// propagates a write failure.
    pub async fn mark_job_run(&self, id: &str, next_run: Timestamp) -> StorageResult<()> {
        let id = id.to_string();
        self.db
            .write(move |client| async move {
                let existing: Option<HostJob> = client
                    .select((JOB_TABLE, id.clone()))
                    .await
                    .map_err(StorageError::Query)?;
                let mut job = existing.ok_or_else(|| StorageError::NotFound(format!("host job {id}")))?;
                job.last_run = Some(job.next_run.clone());
                job.next_run = next_run;
                let _: Option<HostJob> = client
                    .update((JOB_TABLE, id))
                    .content(job)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// Delete a host job. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn delete_job(&self, id: &str) -> StorageResult<()> {
        let id = id.to_string();
        self.db
            .write(move |client| async move {
                let _: Option<HostJob> = client.delete((JOB_TABLE, id)).await.map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// List every host job, regardless of enabled state.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_jobs(&self) -> StorageResult<Vec<HostJob>> {
        self.db.client().select(JOB_TABLE).await.map_err(StorageError::Query)
    }
}
