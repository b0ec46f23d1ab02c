//! Security-decision log entry (§3 `AuditEvent`).

use serde::{Deserialize, Serialize};

use crate::security::{Decision, Taints};
use crate::timestamp::Timestamp;

/// One evaluated action, recorded for post-hoc review regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The gate's decision for this action.
    pub decision: Decision,
    /// Name of the tool or service invoked.
    pub tool_name: String,
    /// Workspace the action originated from.
    pub workspace: String,
    /// Gate taint state at the moment of evaluation.
    pub taints: Taints,
    /// Short human-readable explanation of the decision.
    pub reason: String,
    /// Correlates with the originating `tasks/` request, if any.
    pub request_id: Option<String>,
    /// When the decision was rendered.
    pub timestamp: Timestamp,
}

impl AuditEvent {
    /// Build an audit event stamped with the current time.
    #[must_use]
    pub fn new(
        decision: Decision,
        tool_name: impl Into<String>,
        workspace: impl Into<String>,
        taints: Taints,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            decision,
            tool_name: tool_name.into(),
            workspace: workspace.into(),
            taints,
            reason: reason.into(),
            request_id: None,
            timestamp: Timestamp::now(),
        }
    }

    /// Attach the correlating request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
