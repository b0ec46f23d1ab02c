//! CRUD and retention helpers for [`Message`] records.

use astrid_core::{Message, MessageId, Timestamp};

use crate::db::Db;
use crate::error::{StorageError, StorageResult};

const TABLE: &str = "message";

/// Message persistence and ingest idempotency.
#[derive(Clone, Debug)]
pub struct MessageStore {
    db: Db,
}

impl MessageStore {
    /// Wrap `db` for message access.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a message. Message ids are globally unique (§3); inserting a
    /// duplicate id overwrites the prior record rather than erroring, since
    /// at-least-once channel delivery can redeliver the same message.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn put(&self, message: &Message) -> StorageResult<()> {
        let id = message.id.0.clone();
        let message = message.clone();
        self.db
            .write(move |client| async move {
                let _: Option<Message> = client
                    .upsert((TABLE, id))
                    .content(message)
                    .await
                    .map_err(StorageError::Query)?;
                Ok(())
            })
            .await
    }

    /// `true` if a message with this id has already been stored.
    ///
    /// Used by channel adapters to de-duplicate at-least-once redelivery
    /// before the message ever reaches the router.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn exists(&self, id: &MessageId) -> StorageResult<bool> {
        let found: Option<Message> = self
            .db
            .client()
            .select((TABLE, id.0.clone()))
            .await
            .map_err(StorageError::Query)?;
        Ok(found.is_some())
    }

    /// List messages for a chat in id order (ids are timestamp-prefixed so
    /// this is also chronological order within the chat).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_chat(&self, chat_id: &str) -> StorageResult<Vec<Message>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM type::table($table) WHERE chat_id = $chat_id ORDER BY id ASC")
            .bind(("table", TABLE))
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(StorageError::Query)?;
        response.take(0).map_err(StorageError::Query)
    }

    /// Delete every message from `sender` with a timestamp strictly before
    /// `before`. Used for audit-log retention policies.
    ///
    /// Returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn prune_messages_by_sender(&self, sender: &str, before: &Timestamp) -> StorageResult<u64> {
        let sender = sender.to_string();
        let before = before.as_str().to_string();
        self.db
            .write(move |client| async move {
                let mut response = client
                    .query(
                        "DELETE FROM type::table($table) WHERE sender = $sender AND timestamp < $before RETURN BEFORE",
                    )
                    .bind(("table", TABLE))
                    .bind(("sender", sender))
                    .bind(("before", before))
                    .await
                    .map_err(StorageError::Query)?;
                let deleted: Vec<Message> = response.take(0).map_err(StorageError::Query)?;
                Ok(deleted.len() as u64)
            })
            .await
    }
}
