//! The `Channel` capability set (§6) — the uniform interface every concrete
//! chat adapter (WhatsApp, Slack, Telegram, terminal UI) must expose.
//!
//! Concrete adapters are out of scope for this workspace (§1); this trait is
//! the seam the core consumes them through. Optional capabilities are
//! modelled as `Option`-returning methods with a default "unsupported"
//! implementation rather than duck-typed attribute checks, per the
//! redesign flags in §9 — composite channels simply override the methods
//! they support.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A question posed to the user via the `ask_user` flow, with optional
/// multiple-choice options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub text: String,
    /// Optional multiple-choice options; free text if absent.
    pub options: Option<Vec<String>>,
}

/// Errors a channel adapter can report back to the host.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel is not currently connected (non-fatal; caller logs and continues).
    #[error("channel not connected")]
    NotConnected,
    /// The underlying transport reported an error.
    #[error("transport error: {0}")]
    Transport(String),
    /// This capability is not supported by this channel implementation.
    #[error("capability not supported by this channel")]
    Unsupported,
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// The minimum surface every channel adapter must expose (§6).
///
/// Every method that the table marks "Optional" has a default
/// implementation returning [`ChannelError::Unsupported`]; the message bus
/// (`astrid-events`) treats that as a capability absence, not a failure.
#[async_trait]
pub trait Channel: Send + Sync {
    /// A stable name for this channel instance (e.g. `"telegram"`).
    fn name(&self) -> &str;

    /// Does this channel route this canonical chat?
    fn owns(&self, chat_id: &str) -> bool;

    /// Ready to send?
    fn is_connected(&self) -> bool;

    /// Fire-and-forget send; non-fatal on error (caller logs and continues).
    async fn send_message(&self, chat_id: &str, text: &str) -> ChannelResult<()>;

    /// React to a previously sent message. Optional.
    async fn send_reaction(&self, _chat_id: &str, _message_id: &str, _emoji: &str) -> ChannelResult<()> {
        Err(ChannelError::Unsupported)
    }

    /// Toggle a typing indicator. Optional.
    async fn set_typing(&self, _chat_id: &str, _typing: bool) -> ChannelResult<()> {
        Err(ChannelError::Unsupported)
    }

    /// Update a previously sent message in place. Optional; enables streaming.
    async fn update_message(&self, _chat_id: &str, _message_id: &str, _text: &str) -> ChannelResult<()> {
        Err(ChannelError::Unsupported)
    }

    /// Whether [`Self::update_message`] is actually wired up. The bus uses
    /// this to decide between in-place streaming updates and a single final
    /// message, without calling the method speculatively.
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Render a blocking question to the user. Returns the platform-native
    /// message id of the rendered question bubble, if any. Optional;
    /// required to enable the `ask_user` flow on this channel.
    async fn send_ask_user(
        &self,
        _chat_id: &str,
        _request_id: &str,
        _questions: &[Question],
    ) -> ChannelResult<Option<String>> {
        Err(ChannelError::Unsupported)
    }

    /// Whether [`Self::send_ask_user`] is wired up.
    fn supports_ask_user(&self) -> bool {
        false
    }

    /// Provision a new chat for scheduled-agent use. Optional; admin-only.
    async fn create_group(&self, _name: &str) -> ChannelResult<String> {
        Err(ChannelError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    #[async_trait]
    impl Channel for Minimal {
        fn name(&self) -> &str {
            "minimal"
        }

        fn owns(&self, chat_id: &str) -> bool {
            chat_id == "c1"
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn send_message(&self, _chat_id: &str, _text: &str) -> ChannelResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn optional_capabilities_default_to_unsupported() {
        let channel = Minimal;
        assert!(channel.owns("c1"));
        assert!(!channel.owns("c2"));
        let err = channel.send_reaction("c1", "m1", "eyes").await.unwrap_err();
        assert!(matches!(err, ChannelError::Unsupported));
        assert!(!channel.supports_streaming());
        assert!(!channel.supports_ask_user());
    }
}
