//! Append-only audit log (§4's component L): one file per event, under a
//! data root, relying on the same write-temp-then-rename ordering the IPC
//! fabric uses so the log can be tailed by a watcher exactly like any other
//! output stream.

use std::path::{Path, PathBuf};

use astrid_core::AuditEvent;
use astrid_fs::{append_ordered_json, list_ordered};
use tracing::info;

use crate::error::{AuditError, AuditResult};

/// Append-only store of security decisions and message records.
#[derive(Clone, Debug)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Open (and create, if missing) the audit log rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Append one event. Every decision the gate renders is recorded here,
    /// `allow` included — the log exists for post-hoc review, not just
    /// incident response.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub async fn record(&self, event: &AuditEvent) -> AuditResult<PathBuf> {
        let path = append_ordered_json(&self.dir, event).await?;
        info!(
            decision = ?event.decision,
            tool = %event.tool_name,
            workspace = %event.workspace,
            "audit event recorded"
        );
        Ok(path)
    }

    /// Read every event currently on disk, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a record fails
    /// to parse.
    pub async fn read_all(&self) -> AuditResult<Vec<AuditEvent>> {
        let mut events = Vec::new();
        for path in list_ordered(&self.dir).await? {
            events.push(read_event(&path).await?);
        }
        Ok(events)
    }

    /// Read events for a given workspace, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a record fails
    /// to parse.
    pub async fn read_for_workspace(&self, workspace: &str) -> AuditResult<Vec<AuditEvent>> {
        Ok(self.read_all().await?.into_iter().filter(|e| e.workspace == workspace).collect())
    }

    /// Delete every event file whose recorded timestamp sorts before
    /// `cutoff` (ISO-8601 UTC string — compares lexicographically, which
    /// is chronological order for this format). Returns the number
    /// pruned.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a record fails to
    /// parse, or a delete fails.
    pub async fn prune_before(&self, cutoff: &str) -> AuditResult<u64> {
        let mut pruned = 0u64;
        for path in list_ordered(&self.dir).await? {
            let event = read_event(&path).await?;
            if event.timestamp.as_str() < cutoff {
                tokio::fs::remove_file(&path).await.map_err(|source| astrid_fs::FsError::Io {
                    path: path.clone(),
                    source,
                })?;
                pruned += 1;
            }
        }
        Ok(pruned)
    }
}

async fn read_event(path: &Path) -> AuditResult<AuditEvent> {
    let bytes = tokio::fs::read(path).await.map_err(|source| astrid_fs::FsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| AuditError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use astrid_core::{Decision, Taints};

    use super::*;

    #[tokio::test]
    async fn records_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        log.record(&AuditEvent::new(Decision::Allow, "fs_read", "w1", Taints::clean(), "clean read"))
            .await
            .unwrap();
        log.record(&AuditEvent::new(Decision::Deny, "shell", "w1", Taints::clean(), "forbidden service"))
            .await
            .unwrap();

        let events = log.read_all().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].decision, Decision::Allow);
        assert_eq!(events[1].decision, Decision::Deny);
    }

    #[tokio::test]
    async fn filters_by_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());
        log.record(&AuditEvent::new(Decision::Allow, "fs_read", "w1", Taints::clean(), "ok"))
            .await
            .unwrap();
        log.record(&AuditEvent::new(Decision::Allow, "fs_read", "w2", Taints::clean(), "ok"))
            .await
            .unwrap();

        let for_w1 = log.read_for_workspace("w1").await.unwrap();
        assert_eq!(for_w1.len(), 1);
        assert_eq!(for_w1[0].workspace, "w1");
    }
}
