//! Chat message entity (§3 `Message`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;
use crate::timestamp::Timestamp;

/// Who originated a message and what it means for downstream handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// A chat participant sent this to the host.
    Inbound,
    /// The worker or host sent this to a chat participant.
    Outbound,
    /// An operational notice (deploy, reset, interrupt) shown inline.
    HostNotice,
    /// A security decision rendered as a chat message (approval prompts).
    SecurityAudit,
}

/// A single chat line, persisted for history, context resumption, and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique id. `(chat_id, id)` is unique.
    pub id: MessageId,
    /// Canonical chat the message belongs to.
    pub chat_id: String,
    /// Platform-native sender id.
    pub sender: String,
    /// Display name of the sender, if known.
    pub sender_name: Option<String>,
    /// The message text.
    pub content: String,
    /// UTC timestamp; monotonic lexicographically within a chat.
    pub timestamp: Timestamp,
    /// Inbound / outbound / host-notice / security-audit.
    pub direction: Direction,
    /// Free-form metadata (platform message id, attachments, …).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Message {
    /// Build a new message with empty metadata.
    #[must_use]
    pub fn new(
        id: MessageId,
        chat_id: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            id,
            chat_id: chat_id.into(),
            sender: sender.into(),
            sender_name: None,
            content: content.into(),
            timestamp: Timestamp::now(),
            direction,
            metadata: HashMap::new(),
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Insert a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
