//! Input and output event shapes for the `ipc/<workspace_folder>/` fabric
//! (§4.B).

use serde::{Deserialize, Serialize};

/// A single event the host writes into `input/`. The worker concatenates
/// the `text` of every file present in name order, delimited by newlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEvent {
    /// The text delivered to the worker for this event.
    pub text: String,
}

impl InputEvent {
    /// Wrap `text` as a message event.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry of the worker's line-delimited output event stream (§4.B, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    /// The worker finished a turn. `result: null` with a non-empty
    /// `new_session_token` is the query-done pulse.
    Result {
        /// The turn's final text, `null` for a query-done pulse.
        #[serde(default)]
        result: Option<String>,
        /// The session token to persist, present on every `result`.
        #[serde(default)]
        new_session_token: Option<String>,
    },
    /// Interim reasoning, not shown to the end user by default.
    Thinking {
        /// The reasoning text.
        text: String,
    },
    /// The worker is invoking a tool.
    ToolUse {
        /// The tool's name.
        name: String,
        /// The tool's input payload.
        input: serde_json::Value,
    },
    /// A chunk of user-facing text, broadcast on the outbound bus (§4.G).
    Text {
        /// The text chunk.
        text: String,
    },
    /// The result of a tool invocation.
    ToolResult {
        /// The tool's output payload.
        content: serde_json::Value,
    },
    /// A host-facing diagnostic, not shown to the end user.
    System {
        /// The diagnostic message.
        message: String,
    },
}

impl OutputEvent {
    /// `true` if this is a query-done pulse: a `result` event with
    /// `result: null` and a non-empty `new_session_token`. The host uses
    /// this to release the workspace's queue slot and persist the session
    /// token without the worker process exiting.
    #[must_use]
    pub fn is_query_done_pulse(&self) -> bool {
        matches!(
            self,
            Self::Result { result: None, new_session_token: Some(token) }
            if !token.is_empty()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_done_pulse_requires_a_null_result_and_a_token() {
        let pulse = OutputEvent::Result { result: None, new_session_token: Some("sess-1".to_string()) };
        assert!(pulse.is_query_done_pulse());

        let normal_result = OutputEvent::Result { result: Some("done".to_string()), new_session_token: Some("sess-1".to_string()) };
        assert!(!normal_result.is_query_done_pulse());

        let no_token = OutputEvent::Result { result: None, new_session_token: None };
        assert!(!no_token.is_query_done_pulse());

        let empty_token = OutputEvent::Result { result: None, new_session_token: Some(String::new()) };
        assert!(!empty_token.is_query_done_pulse());
    }

    #[test]
    fn result_null_round_trips_through_json() {
        let pulse = OutputEvent::Result { result: None, new_session_token: Some("sess-1".to_string()) };
        let raw = serde_json::to_string(&pulse).unwrap();
        assert!(raw.contains("\"result\":null"));
        let parsed: OutputEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, pulse);
    }

    #[test]
    fn output_events_round_trip_through_json() {
        let event = OutputEvent::ToolUse { name: "bash".to_string(), input: serde_json::json!({"command": "ls"}) };
        let raw = serde_json::to_string(&event).unwrap();
        let parsed: OutputEvent = serde_json::from_str(&raw).unwrap();
        match parsed {
            OutputEvent::ToolUse { name, .. } => assert_eq!(name, "bash"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
