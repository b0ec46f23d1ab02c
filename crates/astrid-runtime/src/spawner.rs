//! Worker process launch (§4.E "spawn"), grounded in the original host's
//! `container_manager.orchestrator` (agent-core resolution + mount/arg
//! construction) and `container_manager.process` (the actual subprocess
//! launch). The concrete container/sandbox runtime is out of scope here —
//! a [`WorkerSpawner`] is the seam a real deployment plugs a container
//! runtime into; the default implementation runs the workspace's
//! configured command directly as a child process.

use std::path::Path;
use std::process::Stdio;

use astrid_core::Workspace;
use astrid_workspace::WorkspaceLayout;
use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::error::{RuntimeError, RuntimeResult};

/// Produces a live worker process for a workspace. Implementations decide
/// how the worker binary/image is resolved and how the IPC directory and
/// working directory are exposed to it.
#[async_trait]
pub trait WorkerSpawner: Send + Sync {
    /// Spawn a worker process for `workspace`, wired to `ipc_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Spawn`] if the process could not be
    /// launched.
    async fn spawn(&self, workspace: &Workspace, ipc_dir: &Path, layout: &WorkspaceLayout) -> RuntimeResult<Child>;
}

/// Resolves the worker's entry point from `workspace.container_config`
/// (§3 `Workspace.container_config`), falling back to a configured default
/// command. Mirrors `container_manager.orchestrator.resolve_agent_core`:
/// per-workspace override, else a host-wide default.
#[derive(Debug, Clone)]
pub struct CommandSpawner {
    /// Default command run when a workspace declares no override.
    default_command: String,
    /// Arguments appended after the command.
    default_args: Vec<String>,
}

impl CommandSpawner {
    /// Build a spawner whose default command is `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self { default_command: command.into(), default_args: Vec::new() }
    }

    /// Append default arguments passed to every spawn that doesn't
    /// override them.
    #[must_use]
    pub fn with_default_args(mut self, args: Vec<String>) -> Self {
        self.default_args = args;
        self
    }

    fn resolve_command(&self, workspace: &Workspace) -> (String, Vec<String>) {
        let config = &workspace.container_config;
        let command = config.get("command").and_then(serde_json::Value::as_str).map(str::to_string);
        let args = config.get("args").and_then(serde_json::Value::as_array).map(|values| {
            values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>()
        });
        match (command, args) {
            (Some(command), Some(args)) => (command, args),
            (Some(command), None) => (command, Vec::new()),
            (None, _) => (self.default_command.clone(), self.default_args.clone()),
        }
    }
}

#[async_trait]
impl WorkerSpawner for CommandSpawner {
    async fn spawn(&self, workspace: &Workspace, ipc_dir: &Path, layout: &WorkspaceLayout) -> RuntimeResult<Child> {
        let (command, args) = self.resolve_command(workspace);
        let home_dir = layout.home_dir(&workspace.folder)?;
        tokio::fs::create_dir_all(&home_dir).await.map_err(|source| RuntimeError::Spawn {
            workspace: workspace.folder.to_string(),
            source,
        })?;

        Command::new(&command)
            .args(&args)
            .current_dir(&home_dir)
            .env("ASTRID_IPC_DIR", ipc_dir)
            .env("ASTRID_WORKSPACE_FOLDER", &workspace.folder.0)
            .env("ASTRID_WORKSPACE_ADMIN", workspace.is_admin.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn { workspace: workspace.folder.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::{Workspace, WorkspaceFolder};

    use super::*;

    fn workspace() -> Workspace {
        Workspace::new("w1", "Team", WorkspaceFolder("w1".to_string()), "!agent")
    }

    #[test]
    fn falls_back_to_the_default_command_when_unconfigured() {
        let spawner = CommandSpawner::new("true").with_default_args(vec!["--flag".to_string()]);
        let (command, args) = spawner.resolve_command(&workspace());
        assert_eq!(command, "true");
        assert_eq!(args, vec!["--flag".to_string()]);
    }

    #[test]
    fn a_workspace_override_replaces_the_default() {
        let spawner = CommandSpawner::new("true");
        let mut workspace = workspace();
        workspace.container_config = serde_json::json!({"command": "custom-agent", "args": ["--x"]});
        let (command, args) = spawner.resolve_command(&workspace);
        assert_eq!(command, "custom-agent");
        assert_eq!(args, vec!["--x".to_string()]);
    }
}
