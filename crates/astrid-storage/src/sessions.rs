//! CRUD for the workspace → worker-identity-token binding (§3 `Session`).

use astrid_core::{Session, WorkspaceFolder};

use crate::db::Db;
use crate::error::StorageError;
use crate::error::StorageResult;

const TABLE: &str = "session";

/// Session persistence. Cleared on context-reset or manual session-end.
#[derive(Clone, Debug)]
pub struct SessionStore {
    db: Db,
}

impl SessionStore {
    /// Wrap `db` for session access.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Bind or rebind a session for `workspace_folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn put(&self, session: &Session) -> StorageResult<()> {
        let key = session.workspace_folder.0.clone();
        let session = session.clone();
        self.db
            .write(move |client| async move {
                let _: Option<Session> = client
                    .upsert((TABLE, key))
                    .content(session)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// Fetch the active session for a workspace, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, workspace_folder: &WorkspaceFolder) -> StorageResult<Option<Session>> {
        self.db
            .client()
            .select((TABLE, workspace_folder.0.clone()))
            .await
            .map_err(StorageError::Query)
    }

    /// Clear the session for a workspace (context-reset or session-end).
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn clear(&self, workspace_folder: &WorkspaceFolder) -> StorageResult<()> {
        let key = workspace_folder.0.clone();
        self.db
            .write(move |client| async move {
                let _: Option<Session> = client.delete((TABLE, key)).await.map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }
}
