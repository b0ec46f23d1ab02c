//! Privileged-action requests written by the worker into `tasks/` (§4.B),
//! and their dispatch by prefix table.

use std::path::Path;

use astrid_core::RequestId;
use uuid::Uuid;

use crate::error::{IpcError, IpcResult};

/// A parsed `tasks/` entry: a JSON body that carries `type` and
/// `request_id`, with the rest of the body preserved for the handler.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    /// The request id the host must echo in its `responses/` reply.
    pub request_id: RequestId,
    /// The raw `type` string, e.g. `"service:search"` or `"ask_user:ask"`.
    pub task_type: String,
    /// The full parsed JSON body, for handlers that need fields beyond
    /// `type`/`request_id`.
    pub body: serde_json::Value,
}

/// Which handler table a task type dispatches to (§4.B: "unknown types are
/// dispatched by a prefix table").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// `service:<name>` — an ordinary service call through the security gate.
    Service(String),
    /// `ask_user:<name>` — a pending-question request (§4.I).
    AskUser(String),
    /// `security:<name>` — a gate sub-protocol call, e.g. `bash_check`.
    Security(String),
    /// No recognized prefix.
    Unknown(String),
}

impl TaskRequest {
    /// Parse a `tasks/` file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not valid JSON, or are missing
    /// `type` or a well-formed `request_id`.
    pub fn parse(raw: &str, path: &Path) -> IpcResult<Self> {
        let body: serde_json::Value = serde_json::from_str(raw).map_err(|source| IpcError::Malformed {
            path: path.display().to_string(),
            source,
        })?;

        let task_type = body
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| IpcError::MissingField { path: path.display().to_string(), field: "type" })?
            .to_string();

        let request_id_raw = body
            .get("request_id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| IpcError::MissingField { path: path.display().to_string(), field: "request_id" })?;

        let uuid = Uuid::parse_str(request_id_raw).map_err(|_| IpcError::InvalidRequestId {
            path: path.display().to_string(),
            value: request_id_raw.to_string(),
        })?;

        Ok(Self { request_id: RequestId(uuid), task_type, body })
    }

    /// Classify this task's `type` by its prefix (§4.B).
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        classify_task_type(&self.task_type)
    }
}

/// Classify a raw task `type` string by its prefix table entry.
#[must_use]
pub fn classify_task_type(task_type: &str) -> TaskKind {
    if let Some(rest) = task_type.strip_prefix("service:") {
        TaskKind::Service(rest.to_string())
    } else if let Some(rest) = task_type.strip_prefix("ask_user:") {
        TaskKind::AskUser(rest.to_string())
    } else if let Some(rest) = task_type.strip_prefix("security:") {
        TaskKind::Security(rest.to_string())
    } else {
        TaskKind::Unknown(task_type.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_task_file() {
        let request_id = RequestId::new();
        let raw = serde_json::json!({
            "type": "service:search",
            "request_id": request_id.0.to_string(),
            "query": "astrid",
        })
        .to_string();

        let task = TaskRequest::parse(&raw, Path::new("tasks/001.json")).unwrap();
        assert_eq!(task.request_id, request_id);
        assert_eq!(task.kind(), TaskKind::Service("search".to_string()));
        assert_eq!(task.body["query"], "astrid");
    }

    #[test]
    fn missing_type_is_an_error() {
        let raw = serde_json::json!({"request_id": Uuid::new_v4().to_string()}).to_string();
        let err = TaskRequest::parse(&raw, Path::new("tasks/001.json")).unwrap_err();
        assert!(matches!(err, IpcError::MissingField { field: "type", .. }));
    }

    #[test]
    fn malformed_request_id_is_an_error() {
        let raw = serde_json::json!({"type": "service:x", "request_id": "not-a-uuid"}).to_string();
        let err = TaskRequest::parse(&raw, Path::new("tasks/001.json")).unwrap_err();
        assert!(matches!(err, IpcError::InvalidRequestId { .. }));
    }

    #[test]
    fn classifies_every_prefix() {
        assert_eq!(classify_task_type("service:search"), TaskKind::Service("search".to_string()));
        assert_eq!(classify_task_type("ask_user:ask"), TaskKind::AskUser("ask".to_string()));
        assert_eq!(classify_task_type("security:bash_check"), TaskKind::Security("bash_check".to_string()));
        assert_eq!(classify_task_type("bogus"), TaskKind::Unknown("bogus".to_string()));
    }
}
