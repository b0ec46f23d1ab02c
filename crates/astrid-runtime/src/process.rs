//! A single live worker process and its IPC plumbing (§4.E), grounded in
//! the original host's `container_manager.process` (graceful-stop ladder)
//! and `container_manager.session` (the reader task + registry entry).
//!
//! [`WorkerHandle`] owns the child process and the two background tasks
//! that drain its output: one reads `output/` and forwards every event to
//! an [`OutputSink`], the other reads stderr into a bounded buffer. Both
//! tasks end on their own once the process exits or the IPC directory's
//! watch channel closes — there is no separate cancellation handshake,
//! matching the "crash handling" edge case in §4.E (a dead worker simply
//! stops producing events).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use astrid_config::WorkerConfig;
use astrid_core::{InvocationTs, WorkspaceFolder};
use astrid_ipc::{IpcFabric, OutputEvent, OutputWatcher};
use tokio::process::Child;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::output::OutputSink;

/// A live worker process: its IPC fabric, the child handle, and the
/// bookkeeping the session manager and queue need (last activity for idle
/// eviction, a channel that pulses once per completed turn for the
/// per-workspace queue's warm-continue).
pub struct WorkerHandle {
    /// The workspace this process belongs to.
    pub workspace_folder: WorkspaceFolder,
    /// Chat output should be attributed to.
    pub chat_id: String,
    /// Identifies this invocation to the security gate registry.
    pub invocation_ts: InvocationTs,
    fabric: IpcFabric,
    child: Mutex<Child>,
    started_at: Instant,
    last_activity: Mutex<Instant>,
    alive: AtomicBool,
    turn_done: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl WorkerHandle {
    /// Take ownership of a freshly spawned child and start its reader
    /// tasks. `sink` receives every output event and stderr chunk.
    pub fn spawn(
        workspace_folder: WorkspaceFolder,
        chat_id: String,
        invocation_ts: InvocationTs,
        fabric: IpcFabric,
        mut child: Child,
        sink: Arc<dyn OutputSink>,
        stderr_buffer_bytes: usize,
    ) -> RuntimeResult<Arc<Self>> {
        let stderr = child.stderr.take();
        let (turn_done_tx, turn_done_rx) = mpsc::unbounded_channel();

        let handle = Arc::new(Self {
            workspace_folder,
            chat_id,
            invocation_ts,
            fabric,
            child: Mutex::new(child),
            started_at: Instant::now(),
            last_activity: Mutex::new(Instant::now()),
            alive: AtomicBool::new(true),
            turn_done: Mutex::new(turn_done_rx),
        });

        spawn_output_reader(Arc::clone(&handle), sink.clone(), turn_done_tx);
        if let Some(stderr) = stderr {
            spawn_stderr_reader(Arc::clone(&handle), stderr, sink, stderr_buffer_bytes);
        }

        Ok(handle)
    }

    /// The worker's IPC fabric (used by the task router to watch
    /// `tasks/` and write `responses/`).
    #[must_use]
    pub fn fabric(&self) -> &IpcFabric {
        &self.fabric
    }

    /// `true` until the process exits or is marked dead by a reader task.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Seconds since the last input delivered or output observed.
    #[must_use]
    pub async fn idle_for(&self) -> Duration {
        self.last_activity.lock().await.elapsed()
    }

    /// Seconds since the process was spawned.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Deliver one input text to the worker (§4.G "deliver").
    ///
    /// # Errors
    ///
    /// Returns an error if the process has already exited, or the write
    /// fails.
    pub async fn deliver(&self, text: &str) -> RuntimeResult<()> {
        if !self.is_alive() {
            return Err(RuntimeError::Crashed(self.workspace_folder.to_string()));
        }
        self.fabric.deliver_message(text).await?;
        self.touch().await;
        Ok(())
    }

    /// Wait for the next `result` pulse (a turn completing), returning the
    /// session token it carried so the caller can persist it. Used by the
    /// per-workspace queue to know when it may drain the next batch.
    ///
    /// Returns `None` if the process exited before a pulse arrived.
    pub async fn wait_for_turn_done(&self) -> Option<String> {
        self.turn_done.lock().await.recv().await
    }

    /// Graceful-then-forced stop ladder (§4.E "stop"):
    /// 1. Write the `_close` sentinel and wait up to
    ///    `graceful_stop_seconds` for the process to exit on its own.
    /// 2. Re-assert the close request and wait `force_kill_seconds` more
    ///    (there is no portable, unsafe-free way to send a mid-ladder
    ///    `SIGTERM` distinct from the final kill — see `DESIGN.md`).
    /// 3. Force-kill.
    ///
    /// Always marks the handle dead on return, regardless of which rung
    /// stopped the process.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying `_close` write fails; a
    /// process that must be force-killed is not itself an error.
    pub async fn stop(&self, config: WorkerConfig) -> RuntimeResult<()> {
        if self.already_exited().await {
            self.alive.store(false, Ordering::SeqCst);
            return Ok(());
        }

        self.fabric.close().await?;
        if self.wait_for_exit(Duration::from_secs(config.graceful_stop_seconds)).await {
            self.alive.store(false, Ordering::SeqCst);
            return Ok(());
        }

        warn!(workspace = %self.workspace_folder, "worker did not exit after _close, re-asserting");
        let _ = self.fabric.close().await;
        if self.wait_for_exit(Duration::from_secs(config.force_kill_seconds)).await {
            self.alive.store(false, Ordering::SeqCst);
            return Ok(());
        }

        warn!(workspace = %self.workspace_folder, "force-killing unresponsive worker");
        let mut child = self.child.lock().await;
        let _ = child.kill().await;
        self.alive.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    async fn already_exited(&self) -> bool {
        let mut child = self.child.lock().await;
        matches!(child.try_wait(), Ok(Some(_)))
    }

    async fn wait_for_exit(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut child = self.child.lock().await;
                if matches!(child.try_wait(), Ok(Some(_))) {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn mark_dead(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            warn!(workspace = %self.workspace_folder, "worker session ended");
        }
    }
}

fn spawn_output_reader(handle: Arc<WorkerHandle>, sink: Arc<dyn OutputSink>, turn_done: mpsc::UnboundedSender<String>) {
    tokio::spawn(async move {
        let mut watcher = match OutputWatcher::new(handle.fabric.output_dir()).await {
            Ok(w) => w,
            Err(e) => {
                warn!(workspace = %handle.workspace_folder, error = %e, "could not watch worker output dir");
                handle.mark_dead().await;
                return;
            },
        };
        loop {
            match watcher.next().await {
                Ok(Some(event)) => {
                    handle.touch().await;
                    let pulse_token = if event.is_query_done_pulse() {
                        if let OutputEvent::Result { new_session_token: Some(token), .. } = &event {
                            Some(token.clone())
                        } else {
                            None
                        }
                    } else {
                        None
                    };
                    sink.on_output(&handle.workspace_folder, event).await;
                    if let Some(token) = pulse_token {
                        let _ = turn_done.send(token);
                    }
                },
                Ok(None) | Err(_) => break,
            }
        }
        handle.mark_dead().await;
    });
}

fn spawn_stderr_reader(
    handle: Arc<WorkerHandle>,
    stderr: tokio::process::ChildStderr,
    sink: Arc<dyn OutputSink>,
    cap: usize,
) {
    use tokio::io::{AsyncBufReadExt, BufReader};

    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        let mut buffer = String::new();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if buffer.len() + line.len() + 1 > cap {
                        buffer.push_str("\n...[truncated]...\n");
                        sink.on_stderr(&handle.workspace_folder, &buffer).await;
                        buffer.clear();
                    }
                    buffer.push_str(&line);
                    buffer.push('\n');
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(workspace = %handle.workspace_folder, error = %e, "stderr read failed");
                    break;
                },
            }
        }
        if !buffer.is_empty() {
            sink.on_stderr(&handle.workspace_folder, &buffer).await;
        }
        info!(workspace = %handle.workspace_folder, "worker stderr stream closed");
    });
}
