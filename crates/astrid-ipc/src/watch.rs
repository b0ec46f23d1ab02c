//! Watching `output/` and `tasks/` for newly-appeared worker files (§4.B).

use std::path::PathBuf;

use astrid_fs::DirWatcher;
use tracing::debug;

use crate::error::{IpcError, IpcResult};
use crate::event::OutputEvent;
use crate::fabric::IpcFabric;
use crate::task::TaskRequest;

/// Reads the worker's output event stream in name order.
pub struct OutputWatcher {
    inner: DirWatcher,
}

impl OutputWatcher {
    /// Start watching `output_dir` for newly-appeared event files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or watched.
    pub async fn new(output_dir: impl Into<PathBuf>) -> IpcResult<Self> {
        Ok(Self { inner: DirWatcher::new(output_dir).await? })
    }

    /// Wait for and parse the next output event.
    ///
    /// # Errors
    ///
    /// Returns an error if a file appears but fails to parse as an
    /// [`OutputEvent`]. Returns `Ok(None)` only if the underlying watch
    /// channel closes.
    pub async fn next(&mut self) -> IpcResult<Option<OutputEvent>> {
        let Some(found) = self.inner.next().await else { return Ok(None) };
        let raw = tokio::fs::read_to_string(&found.path)
            .await
            .map_err(|source| astrid_fs::FsError::Io { path: found.path.clone(), source })?;
        let event: OutputEvent = serde_json::from_str(&raw).map_err(|source| IpcError::Malformed {
            path: found.path.display().to_string(),
            source,
        })?;
        Ok(Some(event))
    }
}

/// Reads privileged-action requests from `tasks/`, skipping any whose
/// reply has already been written (the at-most-once duplicate check).
pub struct TaskWatcher {
    inner: DirWatcher,
    fabric: IpcFabric,
}

impl TaskWatcher {
    /// Start watching `fabric.tasks_dir()` for newly-appeared request files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or watched.
    pub async fn new(fabric: IpcFabric) -> IpcResult<Self> {
        let inner = DirWatcher::new(fabric.tasks_dir()).await?;
        Ok(Self { inner, fabric })
    }

    /// Wait for the next task request that has not already been answered.
    ///
    /// # Errors
    ///
    /// Returns an error if a file appears but fails to parse as a
    /// [`TaskRequest`]. Returns `Ok(None)` only if the underlying watch
    /// channel closes.
    pub async fn next(&mut self) -> IpcResult<Option<TaskRequest>> {
        loop {
            let Some(found) = self.inner.next().await else { return Ok(None) };
            let raw = tokio::fs::read_to_string(&found.path)
                .await
                .map_err(|source| astrid_fs::FsError::Io { path: found.path.clone(), source })?;
            let task = TaskRequest::parse(&raw, &found.path)?;

            if self.fabric.response_exists(&task.request_id).await {
                debug!(request_id = %task.request_id, path = %found.path.display(), "ignoring duplicate task, already answered");
                continue;
            }
            return Ok(Some(task));
        }
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::RequestId;

    use super::*;

    #[tokio::test]
    async fn output_watcher_parses_appended_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = OutputWatcher::new(dir.path()).await.unwrap();

        let event = serde_json::json!({"type": "text", "text": "hi"});
        tokio::fs::write(dir.path().join("000-aaaaaa.json"), event.to_string()).await.unwrap();

        let found = tokio::time::timeout(std::time::Duration::from_secs(5), watcher.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(found, OutputEvent::Text { text: "hi".to_string() });
    }

    #[tokio::test]
    async fn task_watcher_skips_already_answered_requests() {
        let root = tempfile::tempdir().unwrap();
        let fabric = IpcFabric::new(root.path());
        let mut watcher = TaskWatcher::new(fabric.clone()).await.unwrap();

        let answered = RequestId::new();
        fabric.write_response(&answered, &serde_json::json!({"result": "done"})).await.unwrap();
        tokio::fs::write(
            fabric.tasks_dir().join("000-aaaaaa.json"),
            serde_json::json!({"type": "service:x", "request_id": answered.0.to_string()}).to_string(),
        )
        .await
        .unwrap();

        let pending = RequestId::new();
        tokio::fs::write(
            fabric.tasks_dir().join("001-bbbbbb.json"),
            serde_json::json!({"type": "service:y", "request_id": pending.0.to_string()}).to_string(),
        )
        .await
        .unwrap();

        let found = tokio::time::timeout(std::time::Duration::from_secs(5), watcher.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(found.request_id, pending);
    }
}
