//! Inbound message pipeline (§4.G steps 1-4).

use astrid_core::{Direction, Message, MessageId};
use astrid_storage::Store;

use crate::alias::AliasTable;
use crate::error::EventsResult;
use crate::magic::{detect as detect_magic, CommandWords, MagicCommand};

/// What the router decided to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The message id was already stored; this is a redelivery and was
    /// otherwise ignored.
    Duplicate,
    /// The stripped text matched a magic command.
    Command(MagicCommand),
    /// Ordinary agent input, to be enqueued on the named workspace's queue.
    Enqueue {
        /// The canonical chat id to enqueue against.
        canonical_chat_id: String,
        /// The raw message text.
        text: String,
    },
}

/// Resolves canonical chat ids and dispatches inbound messages to either a
/// magic command or the workspace queue, storing every message exactly
/// once along the way.
#[derive(Debug, Default)]
pub struct InboundRouter {
    /// The JID-alias table (§4.G step 2), public so callers can register
    /// aliases as channel-group registrations happen.
    pub aliases: AliasTable,
    words: CommandWords,
}

impl InboundRouter {
    /// Build a router with the given magic-command word lists.
    #[must_use]
    pub fn new(words: CommandWords) -> Self {
        Self { aliases: AliasTable::new(), words }
    }

    /// Resolve a platform-native chat id to its canonical form (§4.G step 2).
    #[must_use]
    pub fn resolve_chat_id(&self, channel: &str, chat_id_on_channel: &str) -> String {
        self.aliases.resolve(channel, chat_id_on_channel)
    }

    /// Run the inbound pipeline for one message.
    ///
    /// `effective_text` is `raw_text` with the workspace's trigger prefix
    /// already removed by the caller (see [`crate::trigger::strip`]); magic
    /// commands are detected against it, while `raw_text` is what gets
    /// persisted and, on an [`InboundOutcome::Enqueue`], delivered to the
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the state store fails.
    pub async fn route(
        &self,
        store: &Store,
        channel: &str,
        chat_id_on_channel: &str,
        platform_message_id: &str,
        sender: &str,
        sender_name: Option<&str>,
        raw_text: &str,
        effective_text: &str,
    ) -> EventsResult<InboundOutcome> {
        let canonical = self.resolve_chat_id(channel, chat_id_on_channel);
        let id = MessageId(format!("{channel}:{platform_message_id}"));

        if store.messages.exists(&id).await? {
            return Ok(InboundOutcome::Duplicate);
        }

        let mut message = Message::new(id, canonical.clone(), sender, raw_text, Direction::Inbound);
        if let Some(name) = sender_name {
            message = message.with_sender_name(name);
        }
        store.messages.put(&message).await?;

        if let Some(command) = detect_magic(&self.words, effective_text) {
            return Ok(InboundOutcome::Command(command));
        }

        Ok(InboundOutcome::Enqueue { canonical_chat_id: canonical, text: raw_text.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn router_and_store() -> (InboundRouter, Store) {
        (InboundRouter::new(CommandWords::default()), Store::open_memory().await.unwrap())
    }

    #[tokio::test]
    async fn ordinary_text_enqueues_on_the_canonical_chat() {
        let (router, store) = router_and_store().await;
        router.aliases.register("telegram", "123", "acme-team");

        let outcome = router
            .route(&store, "telegram", "123", "m1", "alice", None, "hello there", "hello there")
            .await
            .unwrap();

        assert_eq!(outcome, InboundOutcome::Enqueue { canonical_chat_id: "acme-team".to_string(), text: "hello there".to_string() });
    }

    #[tokio::test]
    async fn magic_command_is_detected_on_the_stripped_text() {
        let (router, store) = router_and_store().await;
        let outcome = router.route(&store, "telegram", "123", "m1", "alice", None, "@assistant reset", "reset").await.unwrap();
        assert_eq!(outcome, InboundOutcome::Command(MagicCommand::Reset));
    }

    #[tokio::test]
    async fn redelivery_of_the_same_platform_message_id_is_a_duplicate() {
        let (router, store) = router_and_store().await;
        router.route(&store, "telegram", "123", "m1", "alice", None, "hello", "hello").await.unwrap();
        let outcome = router.route(&store, "telegram", "123", "m1", "alice", None, "hello", "hello").await.unwrap();
        assert_eq!(outcome, InboundOutcome::Duplicate);
    }

    #[tokio::test]
    async fn same_platform_message_id_on_different_channels_is_not_a_duplicate() {
        let (router, store) = router_and_store().await;
        router.route(&store, "telegram", "123", "m1", "alice", None, "hello", "hello").await.unwrap();
        let outcome = router.route(&store, "slack", "123", "m1", "alice", None, "hello", "hello").await.unwrap();
        assert_ne!(outcome, InboundOutcome::Duplicate);
    }
}
