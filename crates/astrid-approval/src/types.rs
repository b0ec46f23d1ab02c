//! Record types for the pending-approval and pending-question state
//! machines (§4.I).

use astrid_core::{Question, RequestId, SessionToken, Timestamp};
use serde::{Deserialize, Serialize};

/// Which code path dispatches the original action once a human decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerType {
    /// A worker-facing service call (the request data is a service payload).
    Service,
    /// A raw IPC request that bypassed the service dispatch table.
    Ipc,
}

/// A request blocked on a human decision after the gate returned
/// `needs_human`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Unique id of the originating request.
    pub request_id: RequestId,
    /// Name of the tool or service the worker invoked.
    pub tool_name: String,
    /// Workspace folder that originated the request.
    pub source_workspace: String,
    /// Chat the request's workspace is attached to, for the notification.
    pub chat_id: String,
    /// Opaque request payload, replayed verbatim to the handler on approval.
    pub request_data: serde_json::Value,
    /// Which handler re-dispatches the request on approval.
    pub handler_type: HandlerType,
    /// When the pending record was created.
    pub created_at: Timestamp,
}

impl PendingApproval {
    /// Build a pending approval, stamping `created_at` with the current time.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        tool_name: impl Into<String>,
        source_workspace: impl Into<String>,
        chat_id: impl Into<String>,
        request_data: serde_json::Value,
        handler_type: HandlerType,
    ) -> Self {
        Self {
            request_id,
            tool_name: tool_name.into(),
            source_workspace: source_workspace.into(),
            chat_id: chat_id.into(),
            request_data,
            handler_type,
            created_at: Timestamp::now(),
        }
    }

    /// First 8 hex characters of `request_id`, typed by the user to resolve
    /// an `approve`/`deny` command.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.short_id()
    }
}

/// A human's decision on a [`PendingApproval`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum ApprovalDecision {
    /// Dispatch the original action's handler.
    Approve,
    /// Refuse the action; the worker receives a denial response.
    Deny {
        /// Human-readable reason surfaced back to the worker.
        reason: String,
    },
}

impl ApprovalDecision {
    /// `true` for [`ApprovalDecision::Approve`].
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approve)
    }
}

/// A worker blocked on user input via the `ask_user` flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingQuestion {
    /// Unique id of the originating request.
    pub request_id: RequestId,
    /// Workspace folder that originated the request.
    pub source_workspace: String,
    /// Chat the request's workspace is attached to.
    pub chat_id: String,
    /// Channel the question should be rendered on.
    pub channel_name: String,
    /// Session token the worker is blocked under, for the warm-path reply.
    pub session_token: SessionToken,
    /// The questions asked, in order.
    pub questions: Vec<Question>,
    /// Platform-native id of the rendered question message, once known.
    pub message_id: Option<String>,
    /// When the pending record was created.
    pub created_at: Timestamp,
}

impl PendingQuestion {
    /// Build a pending question, stamping `created_at` with the current time.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        source_workspace: impl Into<String>,
        chat_id: impl Into<String>,
        channel_name: impl Into<String>,
        session_token: SessionToken,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            request_id,
            source_workspace: source_workspace.into(),
            chat_id: chat_id.into(),
            channel_name: channel_name.into(),
            session_token,
            questions,
            message_id: None,
            created_at: Timestamp::now(),
        }
    }

    /// Record the platform-native id of the rendered question message.
    pub fn set_message_id(&mut self, message_id: impl Into<String>) {
        self.message_id = Some(message_id.into());
    }
}
