//! CRUD for [`Workspace`] records.

use astrid_core::{Workspace, WorkspaceId};

use crate::db::Db;
use crate::error::{StorageError, StorageResult};

const TABLE: &str = "workspace";

/// Workspace persistence.
#[derive(Clone, Debug)]
pub struct WorkspaceStore {
    db: Db,
}

impl WorkspaceStore {
    /// Wrap `db` for workspace access.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert or fully replace a workspace record, keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn put(&self, workspace: &Workspace) -> StorageResult<()> {
        let id = workspace.id.0.clone();
        let workspace = workspace.clone();
        self.db
            .write(move |client| async move {
                let _: Option<Workspace> = client
                    .upsert((TABLE, id))
                    .content(workspace)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// Fetch a workspace by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] on transport failure. Missing
    /// workspaces yield `Ok(None)`, not an error.
    pub async fn get(&self, id: &WorkspaceId) -> StorageResult<Option<Workspace>> {
        self.db
            .client()
            .select((TABLE, id.0.clone()))
            .await
            .map_err(StorageError::Query)
    }

    /// Fetch a workspace by id, erroring if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no such workspace exists.
    pub async fn require(&self, id: &WorkspaceId) -> StorageResult<Workspace> {
        self.get(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("workspace {}", id.0)))
    }

    /// List all workspaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> StorageResult<Vec<Workspace>> {
        self.db
            .client()
            .select(TABLE)
            .await
            .map_err(StorageError::Query)
    }

    /// Find a workspace whose folder slug matches `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_folder(&self, folder: &str) -> StorageResult<Option<Workspace>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM type::table($table) WHERE folder = $folder LIMIT 1")
            .bind(("table", TABLE))
            .bind(("folder", folder.to_string()))
            .await
            .map_err(StorageError::Query)?;
        let rows: Vec<Workspace> = response.take(0).map_err(StorageError::Query)?;
        Ok(rows.into_iter().next())
    }

    /// Delete a workspace by id. Idempotent: deleting a missing workspace
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn delete(&self, id: &WorkspaceId) -> StorageResult<()> {
        let id = id.0.clone();
        self.db
            .write(move |client| async move {
                let _: Option<Workspace> = client
                    .delete((TABLE, id))
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }
}
