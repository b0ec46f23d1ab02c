//! Shared test harness for end-to-end scenarios (spec §8).

use std::sync::Arc;

use astrid_config::HostConfig;
use astrid_core::{Workspace, WorkspaceFolder};
use astrid_kernel::Host;
use astrid_test::{FakeChannel, FakeSpawner};
use tempfile::TempDir;

/// A running host plus the fixtures a scenario needs to poke at it: a
/// fake channel to observe outbound notices on, and the tempdir backing
/// its data root (kept alive so a second `Host` can reopen the same
/// state, e.g. for the deploy-continuation scenario).
#[allow(dead_code)]
pub struct Harness {
    pub host: Arc<Host<FakeSpawner>>,
    pub channel: Arc<FakeChannel>,
    pub data_root: std::path::PathBuf,
    _dir: TempDir,
}

#[allow(dead_code)]
impl Harness {
    /// Build a harness whose single fake channel owns every chat id in
    /// `owned_chat_ids`.
    pub async fn new(owned_chat_ids: Vec<String>) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let data_root = dir.path().to_path_buf();
        let channel = Arc::new(FakeChannel::new("fake", owned_chat_ids));

        let config = HostConfig { data_root: data_root.clone(), ..HostConfig::default() };
        let host = Host::new(config, FakeSpawner, vec![channel.clone() as Arc<dyn astrid_core::Channel>])
            .await
            .expect("host construction");

        Self { host: Arc::new(host), channel, data_root, _dir: dir }
    }

    /// Re-open a host against the same data root (same on-disk state and
    /// pending deploy continuation, if any).
    pub async fn reopen(&self, owned_chat_ids: Vec<String>) -> (Arc<Host<FakeSpawner>>, Arc<FakeChannel>) {
        let channel = Arc::new(FakeChannel::new("fake", owned_chat_ids));
        let config = HostConfig { data_root: self.data_root.clone(), ..HostConfig::default() };
        let host = Host::new(config, FakeSpawner, vec![channel.clone() as Arc<dyn astrid_core::Channel>])
            .await
            .expect("host construction");
        (Arc::new(host), channel)
    }

    /// Register a non-admin workspace whose folder doubles as its
    /// canonical chat id, as the rest of this crate's routing assumes.
    pub async fn register_workspace(&self, folder: &str) -> Workspace {
        let workspace = Workspace::new(folder.to_string(), folder.to_string(), WorkspaceFolder(folder.to_string()), "!agent");
        self.host.store().workspaces.put(&workspace).await.expect("register workspace");
        workspace
    }
}
