//! Host-side view of the per-workspace IPC directory layout (§4.B).
//!
//! The worker process is opaque to this crate: it is launched and torn down
//! by the session manager, and speaks the directory contract described
//! here. This type only covers the host's half of that contract — writing
//! input and reading output/tasks is this crate's job; draining and parsing
//! input, and emitting output/tasks, is the worker's.

use std::path::{Path, PathBuf};

use astrid_core::RequestId;
use astrid_fs::{append_ordered_json, atomic_write, atomic_write_json};
use serde::Serialize;
use tracing::debug;

use crate::error::IpcResult;
use crate::event::InputEvent;

const CLOSE_FILE: &str = "_close";

/// Resolves and operates on one workspace's `ipc/<folder>/` tree.
#[derive(Debug, Clone)]
pub struct IpcFabric {
    ipc_dir: PathBuf,
}

impl IpcFabric {
    /// Build a fabric handle rooted at a workspace's resolved `ipc/<folder>/`
    /// directory (typically [`astrid_workspace::WorkspaceLayout::ipc_dir`]).
    #[must_use]
    pub fn new(ipc_dir: impl Into<PathBuf>) -> Self {
        Self { ipc_dir: ipc_dir.into() }
    }

    /// `ipc/<folder>/input/`.
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.ipc_dir.join("input")
    }

    /// `ipc/<folder>/output/`.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.ipc_dir.join("output")
    }

    /// `ipc/<folder>/tasks/`.
    #[must_use]
    pub fn tasks_dir(&self) -> PathBuf {
        self.ipc_dir.join("tasks")
    }

    /// `ipc/<folder>/responses/`.
    #[must_use]
    pub fn responses_dir(&self) -> PathBuf {
        self.ipc_dir.join("responses")
    }

    /// `ipc/<folder>/merge_results/`.
    #[must_use]
    pub fn merge_results_dir(&self) -> PathBuf {
        self.ipc_dir.join("merge_results")
    }

    /// `ipc/<folder>/current_tasks.json`.
    #[must_use]
    pub fn current_tasks_path(&self) -> PathBuf {
        self.ipc_dir.join("current_tasks.json")
    }

    /// `ipc/<folder>/available_workspaces.json`.
    #[must_use]
    pub fn available_workspaces_path(&self) -> PathBuf {
        self.ipc_dir.join("available_workspaces.json")
    }

    /// Where the host writes a privileged action's reply for `request_id`.
    #[must_use]
    pub fn response_path(&self, request_id: &RequestId) -> PathBuf {
        self.responses_dir().join(format!("{}.json", request_id.0))
    }

    /// Write a `message` event into `input/` (§4.E `deliver`).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or written to.
    pub async fn deliver_message(&self, text: impl Into<String>) -> IpcResult<PathBuf> {
        let event = InputEvent::message(text);
        let path = append_ordered_json(&self.input_dir(), &event).await?;
        debug!(path = %path.display(), "wrote input event");
        Ok(path)
    }

    /// Write the `_close` sentinel into `input/` (§4.E `stop`). Idempotent:
    /// writing it twice just leaves the same terminal signal in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or written to.
    pub async fn close(&self) -> IpcResult<()> {
        let path = self.input_dir().join(CLOSE_FILE);
        atomic_write(&path, b"{}").await?;
        debug!(path = %path.display(), "wrote close sentinel");
        Ok(())
    }

    /// Atomically write a privileged action's reply at
    /// `responses/<request_id>.json` (§4.B request/response contract).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or written to.
    pub async fn write_response<T: Serialize>(&self, request_id: &RequestId, value: &T) -> IpcResult<()> {
        let path = self.response_path(request_id);
        atomic_write_json(&path, value).await?;
        debug!(path = %path.display(), "wrote task response");
        Ok(())
    }

    /// `true` if a reply already exists for `request_id` — the at-most-once
    /// check a duplicate `tasks/` entry must honor (§4.B).
    #[must_use = "ignoring this check can re-execute an already-handled action"]
    pub async fn response_exists(&self, request_id: &RequestId) -> bool {
        tokio::fs::try_exists(self.response_path(request_id)).await.unwrap_or(false)
    }

    /// Append a value to `merge_results/`, the generic host→worker reply
    /// channel used outside the `tasks/`/`responses/` request correlation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or written to.
    pub async fn write_merge_result<T: Serialize>(&self, value: &T) -> IpcResult<PathBuf> {
        Ok(append_ordered_json(&self.merge_results_dir(), value).await?)
    }

    /// Atomically replace `current_tasks.json` with a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write_current_tasks<T: Serialize>(&self, snapshot: &T) -> IpcResult<()> {
        Ok(atomic_write_json(&self.current_tasks_path(), snapshot).await?)
    }

    /// Atomically replace `available_workspaces.json` with a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write_available_workspaces<T: Serialize>(&self, snapshot: &T) -> IpcResult<()> {
        Ok(atomic_write_json(&self.available_workspaces_path(), snapshot).await?)
    }

    /// The directory this fabric operates under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.ipc_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_message_writes_a_text_field_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let fabric = IpcFabric::new(dir.path());
        let path = fabric.deliver_message("hello").await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: InputEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.text, "hello");
    }

    #[tokio::test]
    async fn close_writes_the_sentinel_file() {
        let dir = tempfile::tempdir().unwrap();
        let fabric = IpcFabric::new(dir.path());
        fabric.close().await.unwrap();
        assert!(fabric.input_dir().join("_close").exists());
    }

    #[tokio::test]
    async fn response_exists_reflects_a_written_reply() {
        let dir = tempfile::tempdir().unwrap();
        let fabric = IpcFabric::new(dir.path());
        let request_id = RequestId::new();
        assert!(!fabric.response_exists(&request_id).await);

        fabric.write_response(&request_id, &serde_json::json!({"result": "ok"})).await.unwrap();
        assert!(fabric.response_exists(&request_id).await);
    }

    #[tokio::test]
    async fn current_tasks_snapshot_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let fabric = IpcFabric::new(dir.path());
        fabric.write_current_tasks(&serde_json::json!([{"id": 1}])).await.unwrap();
        fabric.write_current_tasks(&serde_json::json!([{"id": 2}])).await.unwrap();

        let raw = tokio::fs::read_to_string(fabric.current_tasks_path()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, serde_json::json!([{"id": 2}]));
    }
}
