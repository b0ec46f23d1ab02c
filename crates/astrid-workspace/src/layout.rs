//! Per-workspace directory layout under the host's data root (§4.B).

use std::path::{Path, PathBuf};

use astrid_core::WorkspaceFolder;

use crate::error::WorkspaceResult;
use crate::slug::validate_folder;

/// Resolves the on-disk layout for a workspace, given the host's data root.
/// Every method validates the folder slug before joining it, so a workspace
/// entity with a corrupted or maliciously-set `folder` field can never be
/// used to escape the data root.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    data_root: PathBuf,
}

impl WorkspaceLayout {
    /// Build a layout resolver rooted at `data_root`.
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self { data_root: data_root.into() }
    }

    /// The `ipc/<folder>/` directory (§4.B).
    ///
    /// # Errors
    ///
    /// Returns an error if `folder` is not a safe single path component.
    pub fn ipc_dir(&self, folder: &WorkspaceFolder) -> WorkspaceResult<PathBuf> {
        validate_folder(folder)?;
        Ok(self.data_root.join("ipc").join(&folder.0))
    }

    /// The workspace's home directory, used as the worker's working
    /// directory and for any per-workspace scratch state.
    ///
    /// # Errors
    ///
    /// Returns an error if `folder` is not a safe single path component.
    pub fn home_dir(&self, folder: &WorkspaceFolder) -> WorkspaceResult<PathBuf> {
        validate_folder(folder)?;
        Ok(self.data_root.join("workspaces").join(&folder.0))
    }

    /// The workspace's audit log directory (§4.L).
    ///
    /// # Errors
    ///
    /// Returns an error if `folder` is not a safe single path component.
    pub fn audit_dir(&self, folder: &WorkspaceFolder) -> WorkspaceResult<PathBuf> {
        validate_folder(folder)?;
        Ok(self.data_root.join("audit").join(&folder.0))
    }

    /// The shared `ipc/` root every workspace's IPC directory lives under —
    /// what the approval manager scans to resolve short ids across
    /// workspaces.
    #[must_use]
    pub fn ipc_root(&self) -> PathBuf {
        self.data_root.join("ipc")
    }

    /// The data root itself.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_paths_under_the_data_root() {
        let layout = WorkspaceLayout::new("/var/lib/astrid");
        let folder = WorkspaceFolder("team-standup".to_string());
        assert_eq!(layout.ipc_dir(&folder).unwrap(), PathBuf::from("/var/lib/astrid/ipc/team-standup"));
        assert_eq!(layout.home_dir(&folder).unwrap(), PathBuf::from("/var/lib/astrid/workspaces/team-standup"));
    }

    #[test]
    fn rejects_an_unsafe_folder_before_joining() {
        let layout = WorkspaceLayout::new("/var/lib/astrid");
        let folder = WorkspaceFolder("../etc".to_string());
        assert!(layout.ipc_dir(&folder).is_err());
    }
}
