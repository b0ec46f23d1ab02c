//! Forward-only highwater marks per `(channel, chat, direction)`.

use astrid_core::{ChannelCursor, Direction};

use crate::db::Db;
use crate::error::{StorageError, StorageResult};

const TABLE: &str = "channel_cursor";

/// Cursor persistence.
#[derive(Clone, Debug)]
pub struct CursorStore {
    db: Db,
}

impl CursorStore {
    /// Wrap `db` for cursor access.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Advance the cursor for `(channel, chat_id, direction)` to the max of
    /// its current position and `candidate`, creating the row if absent.
    /// Returns the resulting cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub async fn advance_cursor(
        &self,
        channel: &str,
        chat_id: &str,
        direction: Direction,
        candidate: &str,
    ) -> StorageResult<ChannelCursor> {
        let key = record_key(channel, chat_id, direction);
        let channel = channel.to_string();
        let chat_id = chat_id.to_string();
        let candidate = candidate.to_string();
        self.db
            .write(move |client| async move {
                let existing: Option<ChannelCursor> = client
                    .select((TABLE, key.clone()))
                    .await
                    .map_err(StorageError::Query)?;
                let mut cursor = match existing {
                    Some(cursor) => cursor,
                    None => ChannelCursor::new(channel.clone(), chat_id.clone(), direction, candidate.clone()),
                };
                cursor.advance(&candidate);
                let stored: Option<ChannelCursor> = client
                    .upsert((TABLE, key))
                    .content(cursor.clone())
                    .await
                    .map_err(StorageError::Query)?;
                Ok(stored.unwrap_or(cursor))
            })
            .await
    }

    /// Fetch the current cursor, if one has been recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(
        &self,
        channel: &str,
        chat_id: &str,
        direction: Direction,
    ) -> StorageResult<Option<ChannelCursor>> {
        self.db
            .client()
            .select((TABLE, record_key(channel, chat_id, direction)))
            .await
            .map_err(StorageError::Query)
    }
}

fn record_key(channel: &str, chat_id: &str, direction: Direction) -> String {
    let direction = serde_json::to_value(direction)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());
    format!("{channel}:{chat_id}:{direction}")
}
