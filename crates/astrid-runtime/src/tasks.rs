//! Dispatches a worker's `tasks/` requests to the security gate and the
//! approval/question managers (§4.B "unknown types are dispatched by a
//! prefix table", §4.D, §4.I).
//!
//! Lifecycle/admin verbs (`reset_context`, `deploy`, `schedule_task`, ...)
//! are not `tasks/` entries at all in this design — they arrive as magic
//! commands through `astrid-events`, and are handled by the composition
//! root. This router only ever sees `service:`, `security:`, and
//! `ask_user:` prefixed requests.

use astrid_approval::{ApprovalManager, AwaitOutcome, HandlerType, PendingApproval, QuestionManager};
use astrid_core::{Decision, Question, RequestId, SessionToken, Taints, Workspace};
use astrid_ipc::{TaskKind, TaskRequest};
use astrid_security::{classify_bash, evaluate_bash_escalation, BashClass, BashVerdict, Cop, GateKey, SecurityGate};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::RuntimeResult;

/// What a [`TaskRouter`] produced for one request.
pub enum TaskOutcome {
    /// Write this value to `responses/<request_id>.json` immediately.
    Responded(serde_json::Value),
    /// The request is blocked on a human (an `ask_user` question was
    /// created). No response is written yet; the caller resolves it later
    /// via [`TaskRouter::answer_question`] or the cold path.
    Deferred,
}

#[derive(Deserialize)]
struct ServiceBody {
    #[serde(default)]
    action: ServiceAction,
    #[serde(default)]
    payload: String,
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ServiceAction {
    Read,
    #[default]
    Write,
}

#[derive(Deserialize)]
struct BashCheckBody {
    command: String,
}

#[derive(Deserialize)]
struct AskUserBody {
    session_token: String,
    questions: Vec<Question>,
}

/// Routes one worker invocation's `tasks/` requests. Built per session by
/// the session manager, sharing the host-wide gate and approval/question
/// managers across every workspace.
pub struct TaskRouter<C: Cop> {
    gate: Arc<SecurityGate<C>>,
    approvals: Arc<ApprovalManager>,
    questions: Arc<QuestionManager>,
    approval_timeout: Duration,
}

impl<C: Cop> TaskRouter<C> {
    /// Build a router sharing the host's gate and approval/question state.
    /// `approval_timeout` bounds how long a `needs_human` service call
    /// waits before failing closed; a pending question has no such
    /// timeout — it waits for the chat reply indefinitely.
    #[must_use]
    pub fn new(gate: Arc<SecurityGate<C>>, approvals: Arc<ApprovalManager>, questions: Arc<QuestionManager>, approval_timeout: Duration) -> Self {
        Self { gate, approvals, questions, approval_timeout }
    }

    /// Handle one parsed `tasks/` request for `workspace`, under taint key
    /// `key`, on chat `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the approval or question store fails to write.
    pub async fn handle(&self, workspace: &Workspace, key: &GateKey, chat_id: &str, request: &TaskRequest) -> RuntimeResult<TaskOutcome> {
        match request.kind() {
            TaskKind::Service(name) => self.handle_service(workspace, key, chat_id, &name, request).await,
            TaskKind::Security(name) if name == "bash_check" => self.handle_bash_check(key, request).await,
            TaskKind::Security(name) => Ok(TaskOutcome::Responded(serde_json::json!({
                "decision": "deny",
                "reason": format!("unrecognized security sub-protocol: {name}"),
            }))),
            TaskKind::AskUser(_) => self.handle_ask_user(workspace, chat_id, request).await,
            TaskKind::Unknown(task_type) => {
                warn!(task_type, "unrecognized task type, denying");
                Ok(TaskOutcome::Responded(serde_json::json!({
                    "decision": "deny",
                    "reason": format!("unrecognized task type: {task_type}"),
                })))
            },
        }
    }

    /// Resolve a pending question once the user has answered it (warm
    /// path): write the IPC response and clear the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the question store or IPC write fails.
    pub async fn answer_question(&self, fabric: &astrid_ipc::IpcFabric, workspace_folder: &str, request_id: &RequestId, answers: Vec<String>) -> RuntimeResult<()> {
        fabric.write_response(request_id, &serde_json::json!({ "answers": answers })).await?;
        self.questions.clear(workspace_folder, request_id).await?;
        Ok(())
    }

    async fn handle_service(
        &self,
        workspace: &Workspace,
        key: &GateKey,
        chat_id: &str,
        service_name: &str,
        request: &TaskRequest,
    ) -> RuntimeResult<TaskOutcome> {
        let body: ServiceBody = serde_json::from_value(request.body.clone()).unwrap_or(ServiceBody {
            action: ServiceAction::default(),
            payload: String::new(),
        });
        let trust = workspace.security.service(service_name);
        let kind = match body.action {
            ServiceAction::Read => astrid_security::ActionKind::Read,
            ServiceAction::Write => astrid_security::ActionKind::Write,
        };

        let outcome = self
            .gate
            .evaluate(
                key,
                astrid_security::EvalRequest {
                    service: service_name,
                    trust,
                    kind,
                    payload: &body.payload,
                    is_admin: workspace.is_admin,
                },
            )
            .await;

        match outcome.decision {
            Decision::Allow => Ok(TaskOutcome::Responded(serde_json::json!({ "decision": "allow" }))),
            Decision::Deny => Ok(TaskOutcome::Responded(serde_json::json!({ "decision": "deny", "reason": outcome.reason }))),
            Decision::NeedsHuman => {
                self.escalate_to_human(workspace, chat_id, service_name, request).await
            },
        }
    }

    async fn handle_bash_check(&self, key: &GateKey, request: &TaskRequest) -> RuntimeResult<TaskOutcome> {
        let body: BashCheckBody = match serde_json::from_value(request.body.clone()) {
            Ok(body) => body,
            Err(_) => {
                return Ok(TaskOutcome::Responded(serde_json::json!({
                    "decision": "deny",
                    "reason": "malformed bash_check request",
                })));
            },
        };

        let class = classify_bash(&body.command);
        self.gate.taint(key, Taints { corruption: matches!(class, BashClass::Network), secret: false });
        let taints = self.gate.taints(key);

        let summary = format!("bash command: {}", body.command);
        let verdict = evaluate_bash_escalation(class, taints, self.gate.cop(), &summary).await;
        let decision = match verdict {
            BashVerdict::Allow => "allow",
            BashVerdict::NeedsHuman => "needs_human",
        };
        Ok(TaskOutcome::Responded(serde_json::json!({ "decision": decision })))
    }

    async fn handle_ask_user(&self, workspace: &Workspace, chat_id: &str, request: &TaskRequest) -> RuntimeResult<TaskOutcome> {
        let body: AskUserBody = serde_json::from_value(request.body.clone()).map_err(|source| {
            astrid_ipc::IpcError::Malformed { path: format!("tasks/{}", request.request_id), source }
        })?;

        let question = astrid_approval::PendingQuestion::new(
            request.request_id,
            workspace.folder.to_string(),
            chat_id,
            workspace.trigger.clone(),
            SessionToken(body.session_token),
            body.questions,
        );
        self.questions.create(&question).await?;
        Ok(TaskOutcome::Deferred)
    }

    async fn escalate_to_human(&self, workspace: &Workspace, chat_id: &str, service_name: &str, request: &TaskRequest) -> RuntimeResult<TaskOutcome> {
        let approval = PendingApproval::new(
            request.request_id,
            service_name,
            workspace.folder.to_string(),
            chat_id,
            request.body.clone(),
            HandlerType::Service,
        );
        self.approvals.create(&approval).await?;

        let outcome = self.approvals.await_decision(&workspace.folder.0, &request.request_id, self.approval_timeout).await?;
        let response = match outcome {
            AwaitOutcome::Decided(decision) if decision.is_approved() => serde_json::json!({ "decision": "allow" }),
            AwaitOutcome::Decided(astrid_approval::ApprovalDecision::Deny { reason }) => {
                serde_json::json!({ "decision": "deny", "reason": reason })
            },
            AwaitOutcome::TimedOut => serde_json::json!({ "decision": "deny", "reason": "approval timed out" }),
        };
        self.approvals.clear(&workspace.folder.0, &request.request_id).await?;
        Ok(TaskOutcome::Responded(response))
    }
}
