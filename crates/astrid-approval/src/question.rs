//! Pending-question state machine (§4.I `ask_user` flow).
//!
//! Unlike approvals, a question's resolution path branches on whether the
//! worker is still alive: the warm path writes an IPC response directly,
//! the cold path re-enqueues a context paragraph as a normal user message.
//! Both paths are driven by callers outside this crate (the IPC fabric and
//! the runtime queue respectively) — this module only owns the record's
//! lifecycle on disk.

use std::path::PathBuf;

use astrid_core::RequestId;
use astrid_fs::atomic_write_json;
use tracing::info;

use crate::error::{ApprovalError, ApprovalResult};
use crate::types::PendingQuestion;

const PENDING_QUESTIONS_DIR: &str = "pending_questions";

/// Manages pending questions across every workspace under one IPC root.
pub struct QuestionManager {
    ipc_root: PathBuf,
}

impl QuestionManager {
    /// Build a manager rooted at `ipc_root` (the `ipc/` directory under the
    /// data root).
    #[must_use]
    pub fn new(ipc_root: impl Into<PathBuf>) -> Self {
        Self {
            ipc_root: ipc_root.into(),
        }
    }

    fn path(&self, workspace_folder: &str, request_id: &RequestId) -> PathBuf {
        self.ipc_root.join(workspace_folder).join(PENDING_QUESTIONS_DIR).join(format!("{request_id}.json"))
    }

    /// Persist a new pending question (§4.I step 2).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create(&self, question: &PendingQuestion) -> ApprovalResult<()> {
        let path = self.path(&question.source_workspace, &question.request_id);
        atomic_write_json(&path, question).await?;
        info!(
            request_id = %question.request_id,
            workspace = %question.source_workspace,
            channel = %question.channel_name,
            "pending question created"
        );
        Ok(())
    }

    /// Read back a pending question.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or doesn't parse.
    pub async fn get(&self, workspace_folder: &str, request_id: &RequestId) -> ApprovalResult<PendingQuestion> {
        let path = self.path(workspace_folder, request_id);
        let bytes = tokio::fs::read(&path).await.map_err(|source| astrid_fs::FsError::Io { path: path.clone(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| ApprovalError::Corrupt {
            path: path.display().to_string(),
            source,
        })
    }

    /// Record the platform-native message id once the channel has rendered
    /// the question (§4.I step 3).
    ///
    /// # Errors
    ///
    /// Returns an error if the read-modify-write fails.
    pub async fn record_message_id(&self, workspace_folder: &str, request_id: &RequestId, message_id: impl Into<String>) -> ApprovalResult<()> {
        let mut question = self.get(workspace_folder, request_id).await?;
        question.set_message_id(message_id);
        let path = self.path(workspace_folder, request_id);
        atomic_write_json(&path, &question).await?;
        Ok(())
    }

    /// Delete a pending question once it has been answered, on either the
    /// warm or cold path.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails for a reason other than the
    /// file already being gone.
    pub async fn clear(&self, workspace_folder: &str, request_id: &RequestId) -> ApprovalResult<()> {
        let path = self.path(workspace_folder, request_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(astrid_fs::FsError::Io { path, source }.into()),
        }
    }
}

/// Render an answered question as a context paragraph for the cold path:
/// the worker already exited, so the answer is re-delivered as a normal
/// user message instead of an IPC response.
#[must_use]
pub fn cold_path_context(question: &PendingQuestion, answers: &[(String, String)]) -> String {
    let mut paragraph = String::new();
    for (asked, answer) in question.questions.iter().map(|q| &q.text).zip(answers.iter().map(|(_, a)| a)) {
        paragraph.push_str("You previously asked: ");
        paragraph.push_str(asked);
        paragraph.push_str(". The user answered: ");
        paragraph.push_str(answer);
        paragraph.push_str(". ");
    }
    paragraph.push_str("Continue.");
    paragraph
}

#[cfg(test)]
mod tests {
    use astrid_core::{Question, RequestId, SessionToken};

    use super::*;

    fn question(workspace: &str) -> PendingQuestion {
        PendingQuestion::new(
            RequestId::new(),
            workspace,
            "chat-1",
            "whatsapp",
            SessionToken("tok".to_string()),
            vec![Question {
                text: "Deploy to prod?".to_string(),
                options: Some(vec!["yes".to_string(), "no".to_string()]),
            }],
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = QuestionManager::new(dir.path());
        let q = question("w1");
        manager.create(&q).await.unwrap();

        let fetched = manager.get("w1", &q.request_id).await.unwrap();
        assert_eq!(fetched.questions.len(), 1);
        assert!(fetched.message_id.is_none());
    }

    #[tokio::test]
    async fn record_message_id_persists() {
        let dir = tempfile::tempdir().unwrap();
        let manager = QuestionManager::new(dir.path());
        let q = question("w1");
        manager.create(&q).await.unwrap();

        manager.record_message_id("w1", &q.request_id, "wamid.abc123").await.unwrap();
        let fetched = manager.get("w1", &q.request_id).await.unwrap();
        assert_eq!(fetched.message_id.as_deref(), Some("wamid.abc123"));
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = QuestionManager::new(dir.path());
        let q = question("w1");
        manager.create(&q).await.unwrap();
        manager.clear("w1", &q.request_id).await.unwrap();
        assert!(manager.get("w1", &q.request_id).await.is_err());
    }

    #[test]
    fn cold_path_context_reads_as_a_continuation_paragraph() {
        let q = question("w1");
        let paragraph = cold_path_context(&q, &[("Deploy to prod?".to_string(), "yes".to_string())]);
        assert!(paragraph.contains("Deploy to prod?"));
        assert!(paragraph.contains("yes"));
        assert!(paragraph.ends_with("Continue."));
    }
}
