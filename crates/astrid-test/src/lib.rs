//! Shared test fixtures used across the workspace's crates: a
//! [`WorkerSpawner`] that launches a real but harmless child process
//! instead of an agent image, and a [`Channel`] double that records sent
//! messages in memory.
//!
//! Kept as a separate crate (rather than `#[cfg(test)]` helpers duplicated
//! per crate) so `astrid-kernel`, `astrid-runtime`, and
//! `astrid-integration-tests` share one fake instead of drifting.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;

use astrid_core::Workspace;
use astrid_runtime::{RuntimeError, RuntimeResult, WorkerSpawner};
use astrid_workspace::WorkspaceLayout;
use async_trait::async_trait;
use tokio::process::{Child, Command};

/// Spawns `cat` in place of a real worker: it blocks on stdin (so it stays
/// "alive" until the handle closes it) and echoes nothing meaningful on
/// stdout, which is enough for tests that only exercise process lifecycle
/// (spawn, deliver, stop) rather than the IPC protocol itself.
#[derive(Debug, Clone, Default)]
pub struct FakeSpawner;

#[async_trait]
impl WorkerSpawner for FakeSpawner {
    async fn spawn(&self, workspace: &Workspace, _ipc_dir: &Path, layout: &WorkspaceLayout) -> RuntimeResult<Child> {
        let home_dir = layout.home_dir(&workspace.folder)?;
        tokio::fs::create_dir_all(&home_dir).await.map_err(|source| RuntimeError::Spawn {
            workspace: workspace.folder.to_string(),
            source,
        })?;

        Command::new("cat")
            .current_dir(&home_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn { workspace: workspace.folder.to_string(), source })
    }
}

/// An in-memory [`Channel`] that owns every chat id passed to
/// [`FakeChannel::new`] and records every message handed to
/// [`astrid_core::Channel::send_message`] for assertions.
pub struct FakeChannel {
    name: String,
    owned_chat_ids: Vec<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeChannel {
    /// Build a channel that owns `owned_chat_ids` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, owned_chat_ids: Vec<String>) -> Self {
        Self { name: name.into(), owned_chat_ids, sent: Mutex::new(Vec::new()) }
    }

    /// Every `(chat_id, text)` pair sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("fake channel mutex poisoned").clone()
    }
}

#[async_trait]
impl astrid_core::Channel for FakeChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn owns(&self, chat_id: &str) -> bool {
        self.owned_chat_ids.iter().any(|id| id == chat_id)
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> astrid_core::ChannelResult<()> {
        self.sent.lock().expect("fake channel mutex poisoned").push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::Channel;

    use super::*;

    #[test]
    fn fake_channel_only_owns_its_configured_chat_ids() {
        let channel = FakeChannel::new("telegram", vec!["acme".to_string()]);
        assert!(channel.owns("acme"));
        assert!(!channel.owns("other"));
    }

    #[tokio::test]
    async fn fake_channel_records_sent_messages() {
        let channel = FakeChannel::new("telegram", vec!["acme".to_string()]);
        channel.send_message("acme", "hello").await.unwrap();
        assert_eq!(channel.sent(), vec![("acme".to_string(), "hello".to_string())]);
    }
}
