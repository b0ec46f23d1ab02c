//! Trigger-prefix matching: whether an inbound message addresses the
//! workspace's agent at all, and what's left after the trigger is removed
//! (§3 `Workspace.trigger`, §4.G step 4 "stripped trigger prefix").

/// Check whether `text` is addressed to the agent via `trigger`, returning
/// the remainder with the trigger and surrounding whitespace removed.
///
/// An empty trigger matches every message unchanged (workspaces that want
/// every message routed to the agent, with no activation phrase).
#[must_use]
pub fn strip(trigger: &str, text: &str) -> Option<String> {
    if trigger.is_empty() {
        return Some(text.trim().to_string());
    }
    let trimmed = text.trim_start();
    trimmed.strip_prefix(trigger).map(|rest| rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trigger_matches_everything() {
        assert_eq!(strip("", "hello"), Some("hello".to_string()));
    }

    #[test]
    fn matching_trigger_is_stripped() {
        assert_eq!(strip("@assistant", "@assistant hi there"), Some("hi there".to_string()));
    }

    #[test]
    fn leading_whitespace_before_the_trigger_is_ignored() {
        assert_eq!(strip("@assistant", "   @assistant hi"), Some("hi".to_string()));
    }

    #[test]
    fn non_matching_trigger_yields_none() {
        assert_eq!(strip("@assistant", "hello there"), None);
    }
}
