//! Pending-approval state machine (§4.I): create, short-id resolution,
//! decision dispatch, and timeout handling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use astrid_core::RequestId;
use astrid_fs::atomic_write_json;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{ApprovalError, ApprovalResult};
use crate::types::{ApprovalDecision, PendingApproval};

const PENDING_DIR: &str = "pending_approvals";
const DECISIONS_DIR: &str = "approval_decisions";
const RESPONSES_DIR: &str = "responses";

/// How often [`ApprovalManager::await_decision`] polls for a decision file.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of waiting for a human decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwaitOutcome {
    /// The human decided within the timeout.
    Decided(ApprovalDecision),
    /// No decision arrived before `approval_timeout` elapsed.
    TimedOut,
}

/// Manages pending approvals across every workspace under one IPC root.
///
/// Keyed by `(workspace_folder, request_id)`; short-id resolution scans
/// every workspace because the user doesn't type which workspace a
/// request belongs to.
pub struct ApprovalManager {
    ipc_root: PathBuf,
}

impl ApprovalManager {
    /// Build a manager rooted at `ipc_root` (the `ipc/` directory under the
    /// data root — each workspace is a subdirectory of it).
    #[must_use]
    pub fn new(ipc_root: impl Into<PathBuf>) -> Self {
        Self {
            ipc_root: ipc_root.into(),
        }
    }

    fn workspace_dir(&self, workspace_folder: &str) -> PathBuf {
        self.ipc_root.join(workspace_folder)
    }

    fn pending_path(&self, workspace_folder: &str, request_id: &RequestId) -> PathBuf {
        self.workspace_dir(workspace_folder).join(PENDING_DIR).join(format!("{request_id}.json"))
    }

    fn decision_path(&self, workspace_folder: &str, request_id: &RequestId) -> PathBuf {
        self.workspace_dir(workspace_folder).join(DECISIONS_DIR).join(format!("{request_id}.json"))
    }

    fn response_path(&self, workspace_folder: &str, request_id: &RequestId) -> PathBuf {
        self.workspace_dir(workspace_folder).join(RESPONSES_DIR).join(format!("{request_id}.json"))
    }

    /// Step 1: create the pending-approval file. The worker stays blocked
    /// until a response appears in `responses/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create(&self, approval: &PendingApproval) -> ApprovalResult<()> {
        let path = self.pending_path(&approval.source_workspace, &approval.request_id);
        atomic_write_json(&path, approval).await?;
        info!(
            request_id = %approval.request_id,
            short_id = %approval.short_id(),
            workspace = %approval.source_workspace,
            tool = %approval.tool_name,
            "pending approval created"
        );
        Ok(())
    }

    /// Read back a pending approval by its full request id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or doesn't parse.
    pub async fn get(&self, workspace_folder: &str, request_id: &RequestId) -> ApprovalResult<PendingApproval> {
        let path = self.pending_path(workspace_folder, request_id);
        read_json(&path).await
    }

    /// Resolve a user-typed short id against every workspace's pending set.
    /// A unique prefix match succeeds; zero or multiple matches are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] with no match, or
    /// [`ApprovalError::AmbiguousShortId`] with more than one.
    pub async fn resolve_short_id(&self, short_id: &str) -> ApprovalResult<(String, PendingApproval)> {
        let mut matches = Vec::new();
        let mut workspace_dirs = match tokio::fs::read_dir(&self.ipc_root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ApprovalError::NotFound(short_id.to_string()));
            },
            Err(source) => return Err(astrid_fs::FsError::Io { path: self.ipc_root.clone(), source }.into()),
        };

        while let Some(workspace_entry) =
            workspace_dirs.next_entry().await.map_err(|source| astrid_fs::FsError::Io { path: self.ipc_root.clone(), source })?
        {
            let workspace_folder = workspace_entry.file_name().to_string_lossy().to_string();
            let pending_dir = workspace_entry.path().join(PENDING_DIR);
            let Ok(entries) = astrid_fs::list_ordered(&pending_dir).await else {
                continue;
            };
            for path in entries {
                if file_stem_starts_with(&path, short_id) {
                    let approval: PendingApproval = read_json(&path).await?;
                    matches.push((workspace_folder.clone(), approval));
                }
            }
        }

        match matches.len() {
            0 => Err(ApprovalError::NotFound(short_id.to_string())),
            1 => Ok(matches.into_iter().next().expect("checked len == 1")),
            _ => Err(ApprovalError::AmbiguousShortId {
                prefix: short_id.to_string(),
                matches: matches.iter().map(|(_, a)| a.request_id.to_string()).collect(),
            }),
        }
    }

    /// Step 3-4: write a decision file. A channel handler or the CLI calls
    /// this when the user types `approve <short_id>`/`deny <short_id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_decision(&self, workspace_folder: &str, request_id: &RequestId, decision: &ApprovalDecision) -> ApprovalResult<()> {
        let path = self.decision_path(workspace_folder, request_id);
        atomic_write_json(&path, decision).await?;
        Ok(())
    }

    /// Write the final response the worker reads, in `responses/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_response(&self, workspace_folder: &str, request_id: &RequestId, value: &serde_json::Value) -> ApprovalResult<()> {
        let path = self.response_path(workspace_folder, request_id);
        atomic_write_json(&path, value).await?;
        Ok(())
    }

    /// Step 5: delete both the pending and decision files once the
    /// response has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if either removal fails for a reason other than
    /// the file already being gone.
    pub async fn clear(&self, workspace_folder: &str, request_id: &RequestId) -> ApprovalResult<()> {
        remove_if_present(&self.pending_path(workspace_folder, request_id)).await?;
        remove_if_present(&self.decision_path(workspace_folder, request_id)).await?;
        Ok(())
    }

    /// Poll for a decision file until it appears or `timeout` elapses. On
    /// timeout, callers are expected to write `{"error": "timeout"}` to the
    /// response file and clear the pending approval themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if a decision file appears but fails to parse.
    pub async fn await_decision(&self, workspace_folder: &str, request_id: &RequestId, timeout: Duration) -> ApprovalResult<AwaitOutcome> {
        let deadline = tokio::time::Instant::now() + timeout;
        let path = self.decision_path(workspace_folder, request_id);
        loop {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let decision: ApprovalDecision = read_json(&path).await?;
                return Ok(AwaitOutcome::Decided(decision));
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                warn!(request_id = %request_id, workspace = %workspace_folder, "approval timed out");
                return Ok(AwaitOutcome::TimedOut);
            }
            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ApprovalResult<T> {
    let bytes = tokio::fs::read(path).await.map_err(|source| astrid_fs::FsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ApprovalError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

async fn remove_if_present(path: &Path) -> ApprovalResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(astrid_fs::FsError::Io { path: path.to_path_buf(), source }.into()),
    }
}

fn file_stem_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_stem().and_then(|s| s.to_str()).is_some_and(|s| s.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use astrid_core::RequestId;

    use super::*;
    use crate::types::HandlerType;

    fn approval(workspace: &str) -> PendingApproval {
        PendingApproval::new(RequestId::new(), "send_email", workspace, "chat-1", serde_json::json!({"to": "x"}), HandlerType::Service)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let approval = approval("w1");
        manager.create(&approval).await.unwrap();

        let fetched = manager.get("w1", &approval.request_id).await.unwrap();
        assert_eq!(fetched.request_id, approval.request_id);
    }

    #[tokio::test]
    async fn short_id_resolves_a_unique_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let approval = approval("w1");
        manager.create(&approval).await.unwrap();

        let (workspace, resolved) = manager.resolve_short_id(&approval.short_id()).await.unwrap();
        assert_eq!(workspace, "w1");
        assert_eq!(resolved.request_id, approval.request_id);
    }

    #[tokio::test]
    async fn ambiguous_prefix_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let a = approval("w1");
        manager.create(&a).await.unwrap();

        // force a collision on disk: a second workspace's pending file whose
        // name starts with the same short id but belongs to a distinct request.
        let shared_prefix = a.short_id();
        let collide_path = dir.path().join("w2").join(PENDING_DIR).join(format!("{shared_prefix}-collide.json"));
        tokio::fs::create_dir_all(collide_path.parent().unwrap()).await.unwrap();
        let mut colliding = approval("w2");
        colliding.request_id = RequestId::new();
        tokio::fs::write(&collide_path, serde_json::to_vec(&colliding).unwrap()).await.unwrap();

        let result = manager.resolve_short_id(&shared_prefix).await;
        assert!(matches!(result, Err(ApprovalError::AmbiguousShortId { .. })));
    }

    #[tokio::test]
    async fn await_decision_times_out_when_nothing_arrives() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let approval = approval("w1");
        manager.create(&approval).await.unwrap();

        let outcome = manager.await_decision("w1", &approval.request_id, Duration::from_millis(10)).await.unwrap();
        assert_eq!(outcome, AwaitOutcome::TimedOut);
    }

    #[tokio::test]
    async fn await_decision_picks_up_a_written_decision() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let approval = approval("w1");
        manager.create(&approval).await.unwrap();

        manager.write_decision("w1", &approval.request_id, &ApprovalDecision::Approve).await.unwrap();

        let outcome = manager.await_decision("w1", &approval.request_id, Duration::from_secs(1)).await.unwrap();
        match outcome {
            AwaitOutcome::Decided(decision) => assert!(decision.is_approved()),
            AwaitOutcome::TimedOut => panic!("expected a decision"),
        }
    }

    #[tokio::test]
    async fn clear_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ApprovalManager::new(dir.path());
        let approval = approval("w1");
        manager.create(&approval).await.unwrap();
        manager.write_decision("w1", &approval.request_id, &ApprovalDecision::Approve).await.unwrap();

        manager.clear("w1", &approval.request_id).await.unwrap();
        assert!(manager.get("w1", &approval.request_id).await.is_err());
    }
}
