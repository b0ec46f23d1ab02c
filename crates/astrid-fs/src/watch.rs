//! Directory watcher combining native filesystem events with a coarse poll
//! safety net (§5: "a correct implementation uses native events for
//! responsiveness and a coarse poll as a safety net against missed events
//! on path creation").

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::atomic::{is_tmp_path, list_ordered};
use crate::error::{FsError, FsResult};

/// Default interval for the poll safety net.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A new non-tmp file appeared in a watched directory.
#[derive(Debug, Clone)]
pub struct FileAppeared {
    /// The watched directory.
    pub dir: PathBuf,
    /// The file that appeared.
    pub path: PathBuf,
}

/// Watches one directory for newly-created files, emitting [`FileAppeared`]
/// for each non-tmp entry at most once.
///
/// Backed by `notify` for low-latency delivery; a periodic directory listing
/// catches anything `notify` missed (a known risk on some platforms when a
/// path is created before the watch is established, or under heavy event
/// coalescing).
pub struct DirWatcher {
    dir: PathBuf,
    poll_interval: Duration,
    _watcher: RecommendedWatcher,
    raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    seen: HashSet<PathBuf>,
}

impl DirWatcher {
    /// Start watching `dir`. The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the native
    /// watcher cannot be initialized.
    pub async fn new(dir: impl Into<PathBuf>) -> FsResult<Self> {
        Self::with_poll_interval(dir, DEFAULT_POLL_INTERVAL).await
    }

    /// Like [`Self::new`], with an explicit poll interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the native
    /// watcher cannot be initialized.
    pub async fn with_poll_interval(dir: impl Into<PathBuf>, poll_interval: Duration) -> FsResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| FsError::Io {
                path: dir.clone(),
                source,
            })?;

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| FsError::WatcherInit(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| FsError::WatcherInit(e.to_string()))?;

        // Pre-seed `seen` with what's already there — callers that want the
        // existing backlog should use `list_ordered` directly before
        // constructing the watcher; this type only reports *new* arrivals.
        let seen = list_ordered(&dir).await?.into_iter().collect();

        Ok(Self {
            dir,
            poll_interval,
            _watcher: watcher,
            raw_rx,
            seen,
        })
    }

    /// Wait for the next newly-appeared file, polling as a fallback.
    ///
    /// Returns `None` only if the underlying `notify` channel has closed
    /// (the watcher itself was dropped — this should not happen while
    /// `self` is alive, since `self` owns it).
    pub async fn next(&mut self) -> Option<FileAppeared> {
        loop {
            tokio::select! {
                event = self.raw_rx.recv() => {
                    match event {
                        Some(Ok(ev)) => {
                            if let Some(found) = self.handle_event(&ev) {
                                return Some(found);
                            }
                        }
                        Some(Err(e)) => {
                            warn!(dir = %self.dir.display(), error = %e, "directory watcher error");
                        }
                        None => return None,
                    }
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    if let Some(found) = self.poll_once().await {
                        return Some(found);
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> Option<FileAppeared> {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return None;
        }
        for path in &event.paths {
            if let Some(found) = self.note(path) {
                return Some(found);
            }
        }
        None
    }

    async fn poll_once(&mut self) -> Option<FileAppeared> {
        let entries = list_ordered(&self.dir).await.unwrap_or_default();
        for path in entries {
            if let Some(found) = self.note(&path) {
                return Some(found);
            }
        }
        None
    }

    fn note(&mut self, path: &Path) -> Option<FileAppeared> {
        if is_tmp_path(path) || !path.is_file() {
            return None;
        }
        if self.seen.insert(path.to_path_buf()) {
            debug!(path = %path.display(), "file appeared");
            Some(FileAppeared {
                dir: self.dir.clone(),
                path: path.to_path_buf(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_new_files_created_after_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = DirWatcher::with_poll_interval(dir.path(), Duration::from_millis(50))
            .await
            .unwrap();

        let target = dir.path().join("001-aaaaaa.json");
        tokio::fs::write(&target, b"{}").await.unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), watcher.next())
            .await
            .expect("watcher should report the new file")
            .expect("channel should stay open");
        assert_eq!(found.path, target);
    }

    #[tokio::test]
    async fn ignores_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = DirWatcher::with_poll_interval(dir.path(), Duration::from_millis(30))
            .await
            .unwrap();

        tokio::fs::write(dir.path().join("001.json.tmp"), b"{}")
            .await
            .unwrap();
        let real = dir.path().join("002.json");
        tokio::fs::write(&real, b"{}").await.unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), watcher.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.path, real);
    }

    #[tokio::test]
    async fn pre_existing_files_are_not_reported_as_new() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("000.json"), b"{}")
            .await
            .unwrap();

        let mut watcher = DirWatcher::with_poll_interval(dir.path(), Duration::from_millis(30))
            .await
            .unwrap();

        let target = dir.path().join("001.json");
        tokio::fs::write(&target, b"{}").await.unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), watcher.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.path, target);
    }
}
