//! Magic-command detection on the stripped trigger prefix (§4.G step 4).

/// Configurable word lists for the single-/two-word magic commands (§6
/// configuration surface: "Commands: word lists for `reset`,
/// `end_session`, `redeploy`").
#[derive(Debug, Clone)]
pub struct CommandWords {
    /// Words that clear session + history, e.g. `["reset"]`.
    pub reset: Vec<String>,
    /// Words that stop the worker but keep history, e.g. `["end", "stop"]`.
    pub end_session: Vec<String>,
    /// Words that trigger a rebuild-and-restart, e.g. `["redeploy"]`.
    pub redeploy: Vec<String>,
}

impl Default for CommandWords {
    fn default() -> Self {
        Self {
            reset: vec!["reset".to_string()],
            end_session: vec!["end-session".to_string(), "end_session".to_string()],
            redeploy: vec!["redeploy".to_string()],
        }
    }
}

/// A recognized magic command (§4.G step 4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagicCommand {
    /// Clear session + history.
    Reset,
    /// Stop the worker but keep history.
    EndSession,
    /// Rebuild and restart the host.
    Redeploy,
    /// `approve <short_id>`.
    Approve(String),
    /// `deny <short_id>`.
    Deny(String),
    /// List outstanding pending approvals/questions.
    PendingList,
}

/// Detect a magic command in already-trigger-stripped text, or `None` if
/// `text` is ordinary agent input.
#[must_use]
pub fn detect(words: &CommandWords, text: &str) -> Option<MagicCommand> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();

    if matches_any(&lower, &words.reset) {
        return Some(MagicCommand::Reset);
    }
    if matches_any(&lower, &words.end_session) {
        return Some(MagicCommand::EndSession);
    }
    if matches_any(&lower, &words.redeploy) {
        return Some(MagicCommand::Redeploy);
    }
    if lower == "pending" || lower == "list pending" {
        return Some(MagicCommand::PendingList);
    }
    if let Some(short_id) = strip_two_word(&lower, trimmed, "approve") {
        return Some(MagicCommand::Approve(short_id));
    }
    if let Some(short_id) = strip_two_word(&lower, trimmed, "deny") {
        return Some(MagicCommand::Deny(short_id));
    }
    None
}

fn matches_any(lower: &str, words: &[String]) -> bool {
    words.iter().any(|w| lower == w.to_ascii_lowercase())
}

/// `"<verb> <argument>"` → the argument, matched case-insensitively on the
/// verb but preserving the argument's original case (short ids are
/// hex-derived so case never matters in practice, but we don't assume it).
fn strip_two_word(lower: &str, original: &str, verb: &str) -> Option<String> {
    let prefix = format!("{verb} ");
    if !lower.starts_with(&prefix) {
        return None;
    }
    let argument = original.get(prefix.len()..)?.trim();
    if argument.is_empty() {
        None
    } else {
        Some(argument.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_configured_single_word_commands() {
        let words = CommandWords::default();
        assert_eq!(detect(&words, "reset"), Some(MagicCommand::Reset));
        assert_eq!(detect(&words, "Reset"), Some(MagicCommand::Reset));
        assert_eq!(detect(&words, "end_session"), Some(MagicCommand::EndSession));
        assert_eq!(detect(&words, "redeploy"), Some(MagicCommand::Redeploy));
    }

    #[test]
    fn detects_pending_list_query() {
        let words = CommandWords::default();
        assert_eq!(detect(&words, "pending"), Some(MagicCommand::PendingList));
        assert_eq!(detect(&words, "list pending"), Some(MagicCommand::PendingList));
    }

    #[test]
    fn detects_approve_and_deny_with_their_argument() {
        let words = CommandWords::default();
        assert_eq!(detect(&words, "approve a7f3b2c1"), Some(MagicCommand::Approve("a7f3b2c1".to_string())));
        assert_eq!(detect(&words, "deny a7f3b2c1"), Some(MagicCommand::Deny("a7f3b2c1".to_string())));
        assert_eq!(detect(&words, "approve"), None, "missing argument is not a command");
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        let words = CommandWords::default();
        assert_eq!(detect(&words, "what's the weather today?"), None);
    }
}
