//! Session binding between a workspace and the worker's resumable context
//! (§3 `Session`).

use serde::{Deserialize, Serialize};

use crate::ids::{SessionToken, WorkspaceFolder};

/// Binds a workspace folder to the worker identity token it should present
/// to resume logical conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The workspace this session belongs to.
    pub workspace_folder: WorkspaceFolder,
    /// Token presented to the worker to resume context.
    pub token: SessionToken,
}

impl Session {
    /// Bind a new session.
    #[must_use]
    pub fn new(workspace_folder: WorkspaceFolder, token: SessionToken) -> Self {
        Self {
            workspace_folder,
            token,
        }
    }
}
