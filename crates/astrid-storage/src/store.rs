//! Composed facade over every entity store, built on one shared connection.

use crate::cursors::CursorStore;
use crate::db::Db;
use crate::error::StorageResult;
use crate::messages::MessageStore;
use crate::schedule::ScheduleStore;
use crate::sessions::SessionStore;
use crate::workspaces::WorkspaceStore;

/// The full state store: one embedded connection shared by every entity's
/// typed accessor, all serialized behind the same write lock.
#[derive(Clone, Debug)]
pub struct Store {
    /// Workspace CRUD.
    pub workspaces: WorkspaceStore,
    /// Message CRUD, existence checks, and retention pruning.
    pub messages: MessageStore,
    /// Forward-only channel cursors.
    pub cursors: CursorStore,
    /// Session bindings.
    pub sessions: SessionStore,
    /// Scheduled agent tasks and host jobs.
    pub schedule: ScheduleStore,
}

impl Store {
    fn from_db(db: Db) -> Self {
        Self {
            workspaces: WorkspaceStore::new(db.clone()),
            messages: MessageStore::new(db.clone()),
            cursors: CursorStore::new(db.clone()),
            sessions: SessionStore::new(db.clone()),
            schedule: ScheduleStore::new(db),
        }
    }

    /// Open the store against an embedded, disk-backed database rooted at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn open(path: &str) -> StorageResult<Self> {
        Ok(Self::from_db(Db::connect_embedded(path).await?))
    }

    /// Open an in-memory store. Intended for tests and ephemeral deploys.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn open_memory() -> StorageResult<Self> {
        Ok(Self::from_db(Db::connect_memory().await?))
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::{Direction, Message, MessageId, Workspace, WorkspaceFolder, WorkspaceId};

    use super::*;

    async fn memory_store() -> Store {
        Store::open_memory().await.unwrap()
    }

    #[tokio::test]
    async fn workspace_round_trips_and_is_findable_by_folder() {
        let store = memory_store().await;
        let ws = Workspace::new(
            WorkspaceId::from("w1".to_string()),
            "Demo",
            WorkspaceFolder("demo-folder".to_string()),
            "!agent",
        );
        store.workspaces.put(&ws).await.unwrap();

        let fetched = store.workspaces.require(&WorkspaceId::from("w1".to_string())).await.unwrap();
        assert_eq!(fetched.name, "Demo");

        let by_folder = store.workspaces.find_by_folder("demo-folder").await.unwrap().unwrap();
        assert_eq!(by_folder.id.0, "w1");
    }

    #[tokio::test]
    async fn message_exists_detects_duplicates_for_idempotent_ingest() {
        let store = memory_store().await;
        let msg = Message::new(MessageId("m1".to_string()), "c1", "alice", "hello", Direction::Inbound);
        assert!(!store.messages.exists(&msg.id).await.unwrap());
        store.messages.put(&msg).await.unwrap();
        assert!(store.messages.exists(&msg.id).await.unwrap());
    }

    #[tokio::test]
    async fn cursor_advance_is_forward_only_across_writes() {
        let store = memory_store().await;
        let cursor = store
            .cursors
            .advance_cursor("telegram", "c1", Direction::Inbound, "010")
            .await
            .unwrap();
        assert_eq!(cursor.position, "010");

        let regressed = store
            .cursors
            .advance_cursor("telegram", "c1", Direction::Inbound, "005")
            .await
            .unwrap();
        assert_eq!(regressed.position, "010");

        let advanced = store
            .cursors
            .advance_cursor("telegram", "c1", Direction::Inbound, "020")
            .await
            .unwrap();
        assert_eq!(advanced.position, "020");
    }
}
