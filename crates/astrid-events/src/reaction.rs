//! Reaction-emoji handling (§4.G step 5).

/// The effect a reaction emoji has on the message it's attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    /// `eyes` — re-queue a message check.
    Recheck,
    /// `✗` — interrupt the active worker.
    Interrupt,
}

/// Classify a reaction emoji, or `None` if it has no router-level effect.
#[must_use]
pub fn detect(emoji: &str) -> Option<ReactionKind> {
    match emoji {
        "👀" | "eyes" => Some(ReactionKind::Recheck),
        "✗" | "❌" | "x" => Some(ReactionKind::Interrupt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eyes_requests_a_recheck() {
        assert_eq!(detect("👀"), Some(ReactionKind::Recheck));
    }

    #[test]
    fn cross_requests_an_interrupt() {
        assert_eq!(detect("✗"), Some(ReactionKind::Interrupt));
    }

    #[test]
    fn unrelated_emoji_has_no_effect() {
        assert_eq!(detect("👍"), None);
    }
}
