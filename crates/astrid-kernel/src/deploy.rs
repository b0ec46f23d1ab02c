//! Deploy / lifecycle continuation (§4.K), grounded in the original host's
//! `deploy.py::finalize_deploy`: write a continuation file describing the
//! in-flight chat and active sessions, notify the chat, then shut down.
//! The startup-side resume read has no direct original-source counterpart
//! (the original process just restarts under its supervisor and re-execs
//! its own startup path); it is designed directly from §4.K point 4.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use astrid_fs::atomic_write_json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{KernelError, KernelResult};

const CONTINUATION_FILE: &str = "deploy_continuation.json";

/// Snapshot written just before a self-initiated restart, and replayed on
/// the next startup to resume warm (§4.K).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployContinuation {
    /// Canonical chat id the redeploy was requested from.
    pub chat_id: String,
    /// That chat's session token at deploy time, if any.
    pub session_id: String,
    /// Message injected into the resumed workspace on restart.
    pub resume_prompt: String,
    /// The new HEAD this deploy moved to.
    pub commit_sha: String,
    /// The HEAD before this deploy, for operator rollback reference.
    pub previous_commit_sha: String,
    /// Every workspace with a live session at deploy time, folder → token.
    pub active_sessions: HashMap<String, String>,
}

/// Path to the continuation file under a data root.
#[must_use]
pub fn continuation_path(data_root: &Path) -> PathBuf {
    data_root.join(CONTINUATION_FILE)
}

/// Write the continuation file atomically (§4.K point 2).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_continuation(data_root: &Path, continuation: &DeployContinuation) -> KernelResult<()> {
    let path = continuation_path(data_root);
    atomic_write_json(&path, continuation).await?;
    info!(path = %path.display(), "wrote deploy continuation");
    Ok(())
}

/// Read and delete the continuation file, if one is present (§4.K point
/// 4). Consuming it on read means a later crash-restart unrelated to a
/// redeploy never replays a stale resume notice.
///
/// # Errors
///
/// Returns an error if the file exists but is not valid continuation JSON.
pub async fn load_and_consume_continuation(data_root: &Path) -> KernelResult<Option<DeployContinuation>> {
    let path = continuation_path(data_root);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(KernelError::Fs(astrid_fs::FsError::Io { path, source: e })),
    };

    let continuation: DeployContinuation =
        serde_json::from_str(&raw).map_err(|source| KernelError::CorruptContinuation { path: path.clone(), source })?;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            return Err(KernelError::Fs(astrid_fs::FsError::Io { path, source: e }));
        }
    }

    info!(chat_id = %continuation.chat_id, sessions = continuation.active_sessions.len(), "resuming from deploy continuation");
    Ok(Some(continuation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_written_continuation_round_trips_and_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let continuation = DeployContinuation {
            chat_id: "acme".to_string(),
            session_id: "tok-1".to_string(),
            resume_prompt: "Deploy complete. Verifying service health.".to_string(),
            commit_sha: "abc123".to_string(),
            previous_commit_sha: "def456".to_string(),
            active_sessions: HashMap::from([("acme".to_string(), "tok-1".to_string())]),
        };

        write_continuation(dir.path(), &continuation).await.unwrap();
        let loaded = load_and_consume_continuation(dir.path()).await.unwrap();
        assert_eq!(loaded.unwrap().chat_id, "acme");

        let second = load_and_consume_continuation(dir.path()).await.unwrap();
        assert!(second.is_none(), "the file is removed after the first read");
    }

    #[tokio::test]
    async fn missing_continuation_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_and_consume_continuation(dir.path()).await.unwrap().is_none());
    }
}
