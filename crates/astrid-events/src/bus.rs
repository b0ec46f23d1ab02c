//! Outbound fan-out bus (§4.G outbound pipeline).
//!
//! A single function is the only code path for outbound sends: it resolves
//! which connected channels own a canonical chat id, applies per-channel
//! streaming state, and treats send failures as non-fatal (bounded retry,
//! then log and continue — the source's retry count is unspecified, see
//! `DESIGN.md`).

use std::collections::HashMap;
use std::sync::Arc;

use astrid_core::Channel;
use tokio::sync::Mutex;
use tracing::warn;

/// Bounded retry attempts for a single channel send before giving up and
/// moving on to the next channel (§9 open question: source retry count
/// unspecified; this crate picks a fixed bound and documents it).
pub const SEND_RETRY_ATTEMPTS: u32 = 3;

struct StreamState {
    /// Text accumulated so far this turn.
    accumulated: String,
    /// Synthetic id passed to `update_message`. Concrete channel adapters
    /// are out of scope here; a real adapter would instead return the
    /// first send's platform message id and this bus would track that.
    synthetic_message_id: String,
}

/// Fans worker `text` events out to every connected channel that owns the
/// canonical chat id, and persists host-originated notices as history.
pub struct MessageBus {
    channels: Vec<Arc<dyn Channel>>,
    streaming: Mutex<HashMap<(String, String), StreamState>>,
}

impl MessageBus {
    /// Build a bus over the given connected channels.
    #[must_use]
    pub fn new(channels: Vec<Arc<dyn Channel>>) -> Self {
        Self { channels, streaming: Mutex::new(HashMap::new()) }
    }

    /// Broadcast a chunk of worker `text` output to every channel that owns
    /// `chat_id`. Streaming-capable channels receive an in-place update
    /// after the first chunk; others receive the chunk as a new message.
    pub async fn publish_text(&self, chat_id: &str, text: &str) {
        for channel in self.owning_channels(chat_id) {
            if channel.supports_streaming() {
                self.publish_streaming(channel.as_ref(), chat_id, text).await;
            } else {
                self.send_with_retry(channel.as_ref(), chat_id, text).await;
            }
        }
    }

    /// Broadcast a host-originated notification (deploy, reset, interrupt)
    /// with no streaming behavior — always a new, final message.
    pub async fn publish_host_notice(&self, chat_id: &str, text: &str) {
        for channel in self.owning_channels(chat_id) {
            self.send_with_retry(channel.as_ref(), chat_id, text).await;
        }
    }

    /// Clear accumulated streaming state for a chat — called when a turn
    /// ends (the `result` pulse), so the next turn starts a fresh bubble.
    pub async fn end_turn(&self, chat_id: &str) {
        let mut streaming = self.streaming.lock().await;
        streaming.retain(|(_, cid), _| cid != chat_id);
    }

    fn owning_channels(&self, chat_id: &str) -> Vec<Arc<dyn Channel>> {
        self.channels.iter().filter(|c| c.owns(chat_id)).cloned().collect()
    }

    async fn publish_streaming(&self, channel: &dyn Channel, chat_id: &str, text: &str) {
        let key = (channel.name().to_string(), chat_id.to_string());
        let mut streaming = self.streaming.lock().await;
        match streaming.get_mut(&key) {
            Some(state) => {
                state.accumulated.push_str(text);
                let accumulated = state.accumulated.clone();
                let message_id = state.synthetic_message_id.clone();
                drop(streaming);
                self.update_with_retry(channel, chat_id, &message_id, &accumulated).await;
            },
            None => {
                let synthetic_message_id = format!("{chat_id}:turn");
                streaming.insert(
                    key,
                    StreamState { accumulated: text.to_string(), synthetic_message_id: synthetic_message_id.clone() },
                );
                drop(streaming);
                self.send_with_retry(channel, chat_id, text).await;
            },
        }
    }

    async fn send_with_retry(&self, channel: &dyn Channel, chat_id: &str, text: &str) {
        for attempt in 1..=SEND_RETRY_ATTEMPTS {
            match channel.send_message(chat_id, text).await {
                Ok(()) => return,
                Err(err) if attempt == SEND_RETRY_ATTEMPTS => {
                    warn!(channel = channel.name(), chat_id, error = %err, "giving up on outbound send");
                },
                Err(err) => {
                    warn!(channel = channel.name(), chat_id, attempt, error = %err, "retrying outbound send");
                },
            }
        }
    }

    async fn update_with_retry(&self, channel: &dyn Channel, chat_id: &str, message_id: &str, text: &str) {
        for attempt in 1..=SEND_RETRY_ATTEMPTS {
            match channel.update_message(chat_id, message_id, text).await {
                Ok(()) => return,
                Err(err) if attempt == SEND_RETRY_ATTEMPTS => {
                    warn!(channel = channel.name(), chat_id, error = %err, "giving up on streaming update");
                },
                Err(err) => {
                    warn!(channel = channel.name(), chat_id, attempt, error = %err, "retrying streaming update");
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use astrid_core::{ChannelError, ChannelResult};
    use async_trait::async_trait;

    use super::*;

    struct FixedChannel {
        name: &'static str,
        owned_chat: &'static str,
        streaming: bool,
        sends: AtomicUsize,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl Channel for FixedChannel {
        fn name(&self) -> &str {
            self.name
        }

        fn owns(&self, chat_id: &str) -> bool {
            chat_id == self.owned_chat
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn send_message(&self, _chat_id: &str, _text: &str) -> ChannelResult<()> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn update_message(&self, _chat_id: &str, _message_id: &str, _text: &str) -> ChannelResult<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn supports_streaming(&self) -> bool {
            self.streaming
        }
    }

    struct FailingChannel {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Channel for FailingChannel {
        fn name(&self) -> &str {
            "failing"
        }

        fn owns(&self, _chat_id: &str) -> bool {
            true
        }

        fn is_connected(&self) -> bool {
            false
        }

        async fn send_message(&self, _chat_id: &str, _text: &str) -> ChannelResult<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(ChannelError::Transport("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn only_owning_channels_receive_the_message() {
        let a = Arc::new(FixedChannel { name: "a", owned_chat: "c1", streaming: false, sends: AtomicUsize::new(0), updates: AtomicUsize::new(0) });
        let b = Arc::new(FixedChannel { name: "b", owned_chat: "c2", streaming: false, sends: AtomicUsize::new(0), updates: AtomicUsize::new(0) });
        let bus = MessageBus::new(vec![a.clone(), b.clone()]);

        bus.publish_text("c1", "hi").await;

        assert_eq!(a.sends.load(Ordering::SeqCst), 1);
        assert_eq!(b.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn streaming_channel_updates_in_place_after_the_first_chunk() {
        let channel = Arc::new(FixedChannel { name: "stream", owned_chat: "c1", streaming: true, sends: AtomicUsize::new(0), updates: AtomicUsize::new(0) });
        let bus = MessageBus::new(vec![channel.clone()]);

        bus.publish_text("c1", "hel").await;
        bus.publish_text("c1", "lo").await;

        assert_eq!(channel.sends.load(Ordering::SeqCst), 1, "first chunk opens the bubble");
        assert_eq!(channel.updates.load(Ordering::SeqCst), 1, "second chunk updates it in place");
    }

    #[tokio::test]
    async fn end_turn_resets_streaming_so_the_next_turn_opens_a_new_bubble() {
        let channel = Arc::new(FixedChannel { name: "stream", owned_chat: "c1", streaming: true, sends: AtomicUsize::new(0), updates: AtomicUsize::new(0) });
        let bus = MessageBus::new(vec![channel.clone()]);

        bus.publish_text("c1", "hi").await;
        bus.end_turn("c1").await;
        bus.publish_text("c1", "again").await;

        assert_eq!(channel.sends.load(Ordering::SeqCst), 2);
        assert_eq!(channel.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_failing_channel_retries_then_gives_up_without_panicking() {
        let channel = Arc::new(FailingChannel { attempts: AtomicUsize::new(0) });
        let bus = MessageBus::new(vec![channel.clone()]);

        bus.publish_host_notice("c1", "deploy starting").await;

        assert_eq!(channel.attempts.load(Ordering::SeqCst), SEND_RETRY_ATTEMPTS as usize);
    }
}
