//! Per-`(channel, chat, direction)` highwater mark (§3 `ChannelCursor`).

use serde::{Deserialize, Serialize};

use crate::message::Direction;
use crate::timestamp::Timestamp;

/// Forward-only highwater mark for a channel/chat/direction triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCursor {
    /// Channel name (e.g. `"telegram"`).
    pub channel: String,
    /// Canonical chat id.
    pub chat_id: String,
    /// Which direction this cursor tracks.
    pub direction: Direction,
    /// The highest message id observed so far (lexicographic, forward-only).
    pub position: String,
}

impl ChannelCursor {
    /// Create a new cursor at the given position.
    #[must_use]
    pub fn new(channel: impl Into<String>, chat_id: impl Into<String>, direction: Direction, position: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            chat_id: chat_id.into(),
            direction,
            position: position.into(),
        }
    }

    /// Advance the cursor to `max(self.position, candidate)`.
    ///
    /// Returns `true` if the position actually moved forward.
    pub fn advance(&mut self, candidate: &str) -> bool {
        if candidate > self.position.as_str() {
            self.position = candidate.to_string();
            true
        } else {
            false
        }
    }
}

/// A standalone forward-only max used by the state store's `advance_cursor`.
///
/// Kept free of any storage dependency so both `astrid-storage` and tests can
/// share the exact same comparison semantics.
#[must_use]
pub fn forward_only_max(current: &str, candidate: &str) -> String {
    if candidate > current {
        candidate.to_string()
    } else {
        current.to_string()
    }
}

/// Monotonic filename timestamp helper shared by cursor-adjacent ordering
/// code; re-exported so callers don't need to depend on `astrid-fs` just to
/// compare against a [`Timestamp`].
#[must_use]
pub fn timestamp_sorts_after(a: &Timestamp, b: &Timestamp) -> bool {
    a > b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_forward_only_regardless_of_call_order() {
        let mut a = ChannelCursor::new("telegram", "c1", Direction::Inbound, "010");
        assert!(!a.advance("005"));
        assert_eq!(a.position, "010");
        assert!(a.advance("020"));
        assert_eq!(a.position, "020");
    }

    #[test]
    fn forward_only_max_is_commutative_in_effect() {
        assert_eq!(forward_only_max("005", "010"), "010");
        assert_eq!(forward_only_max("010", "005"), "010");
    }
}
