//! Worker session manager (§4's components E and F): `get_or_spawn`,
//! `deliver`, `stop`, idle eviction, and the background task that drains
//! each workspace's `tasks/` directory into the security gate.
//!
//! Grounded in the original host's `container_manager.session` (the
//! registry keyed by workspace, idle sweep) and `container_manager.process`
//! (the stop ladder now implemented by [`crate::process::WorkerHandle`]).

use std::sync::Arc;
use std::time::Duration;

use astrid_config::WorkerConfig;
use astrid_core::{InvocationTs, Session, SessionToken, Timestamp, Workspace, WorkspaceFolder};
use astrid_ipc::{IpcFabric, TaskWatcher};
use astrid_security::{Cop, GateKey, SecurityGate};
use astrid_storage::SessionStore;
use astrid_workspace::WorkspaceLayout;
use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::RuntimeResult;
use crate::output::OutputSink;
use crate::process::WorkerHandle;
use crate::queue::WorkspaceQueue;
use crate::spawner::WorkerSpawner;
use crate::tasks::{TaskOutcome, TaskRouter};

struct LiveSession {
    workspace: Workspace,
    chat_id: String,
    handle: Arc<WorkerHandle>,
    queue: WorkspaceQueue,
    gate_key: GateKey,
    task_reader: JoinHandle<()>,
}

/// Owns every live worker process, one per workspace, and the queues and
/// task routers that sit in front of each.
pub struct SessionManager<C: Cop + 'static, S: WorkerSpawner + 'static> {
    sessions: DashMap<WorkspaceFolder, Arc<LiveSession>>,
    spawn_locks: DashMap<WorkspaceFolder, Arc<AsyncMutex<()>>>,
    spawner: Arc<S>,
    layout: WorkspaceLayout,
    sink: Arc<dyn OutputSink>,
    gate: Arc<SecurityGate<C>>,
    task_router: Arc<TaskRouter<C>>,
    sessions_store: SessionStore,
    worker_config: WorkerConfig,
}

impl<C: Cop + 'static, S: WorkerSpawner + 'static> SessionManager<C, S> {
    /// Build a session manager. `worker_config` is read fresh from
    /// configuration at construction; a config reload replaces the whole
    /// manager rather than mutating it in place.
    #[must_use]
    pub fn new(
        spawner: Arc<S>,
        layout: WorkspaceLayout,
        sink: Arc<dyn OutputSink>,
        gate: Arc<SecurityGate<C>>,
        task_router: Arc<TaskRouter<C>>,
        sessions_store: SessionStore,
        worker_config: WorkerConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            spawn_locks: DashMap::new(),
            spawner,
            layout,
            sink,
            gate,
            task_router,
            sessions_store,
            worker_config,
        }
    }

    /// Enqueue `text` for `workspace`, spawning its worker if necessary,
    /// and ensure a drain loop is running to deliver it.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace's IPC directory can't be resolved
    /// or the worker fails to spawn.
    pub async fn enqueue(self: &Arc<Self>, workspace: &Workspace, chat_id: &str, text: String) -> RuntimeResult<()> {
        let session = self.get_or_spawn(workspace, chat_id).await?;
        session.queue.push(text).await;
        if session.queue.try_start_drain() {
            let manager = Arc::clone(self);
            let session = Arc::clone(&session);
            tokio::spawn(async move { manager.drain_loop(session).await });
        }
        Ok(())
    }

    /// Drop every not-yet-delivered message for `workspace` (§4.G,
    /// `interrupt` magic command / 🛑 reaction). A turn already handed to
    /// the worker runs to completion.
    pub async fn interrupt(&self, workspace_folder: &WorkspaceFolder) -> usize {
        let Some(session) = self.sessions.get(workspace_folder) else {
            return 0;
        };
        session.queue.clear().await
    }

    /// `true` if a worker is live and its queue is actively draining.
    pub fn is_active(&self, workspace_folder: &WorkspaceFolder) -> bool {
        self.sessions.get(workspace_folder).is_some_and(|s| s.handle.is_alive() && s.queue.is_draining())
    }

    /// Stop a workspace's worker (graceful-then-forced ladder) and remove
    /// it from the registry, releasing its security gate state.
    ///
    /// # Errors
    ///
    /// Returns an error only from the underlying IPC write; see
    /// [`WorkerHandle::stop`].
    pub async fn stop(&self, workspace_folder: &WorkspaceFolder) -> RuntimeResult<()> {
        let Some((_, session)) = self.sessions.remove(workspace_folder) else {
            return Ok(());
        };
        session.task_reader.abort();
        session.handle.stop(self.worker_config).await?;
        self.gate.release(&session.gate_key);
        info!(workspace = %workspace_folder, "worker session stopped");
        Ok(())
    }

    /// Run the idle-eviction sweep forever at `interval`. Intended to be
    /// spawned once at startup: `tokio::spawn(manager.clone().idle_sweep(interval))`.
    pub async fn idle_sweep(self: Arc<Self>, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            let idle_timeout = Duration::from_secs(self.worker_config.idle_timeout_seconds);
            let candidates: Vec<WorkspaceFolder> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
            for folder in candidates {
                let Some(session) = self.sessions.get(&folder).map(|s| Arc::clone(&s)) else { continue };
                if session.queue.is_draining() {
                    continue;
                }
                if session.handle.idle_for().await >= idle_timeout {
                    info!(workspace = %folder, "evicting idle worker");
                    if let Err(e) = self.stop(&folder).await {
                        warn!(workspace = %folder, error = %e, "failed to evict idle worker");
                    }
                }
            }
        }
    }

    async fn get_or_spawn(self: &Arc<Self>, workspace: &Workspace, chat_id: &str) -> RuntimeResult<Arc<LiveSession>> {
        if let Some(session) = self.sessions.get(&workspace.folder) {
            if session.handle.is_alive() {
                return Ok(Arc::clone(&session));
            }
        }

        let lock = Arc::clone(self.spawn_locks.entry(workspace.folder.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).value());
        let _guard = lock.lock().await;

        if let Some(session) = self.sessions.get(&workspace.folder) {
            if session.handle.is_alive() {
                return Ok(Arc::clone(&session));
            }
        }

        let session = self.spawn_session(workspace, chat_id).await?;
        self.sessions.insert(workspace.folder.clone(), Arc::clone(&session));
        Ok(session)
    }

    async fn spawn_session(&self, workspace: &Workspace, chat_id: &str) -> RuntimeResult<Arc<LiveSession>> {
        let ipc_dir = self.layout.ipc_dir(&workspace.folder)?;
        let fabric = IpcFabric::new(ipc_dir.clone());
        let child = self.spawner.spawn(workspace, &ipc_dir, &self.layout).await?;

        let invocation_ts = InvocationTs(Timestamp::now().to_datetime().timestamp_millis());
        let gate_key = GateKey::new(workspace.folder.clone(), invocation_ts);
        self.gate.register(gate_key.clone(), workspace.security.contains_secrets);

        let handle = WorkerHandle::spawn(
            workspace.folder.clone(),
            chat_id.to_string(),
            invocation_ts,
            fabric,
            child,
            Arc::clone(&self.sink),
            self.worker_config.stderr_buffer_bytes,
        )?;

        let task_reader = self.spawn_task_reader(workspace.clone(), chat_id.to_string(), gate_key.clone(), Arc::clone(&handle));

        Ok(Arc::new(LiveSession {
            workspace: workspace.clone(),
            chat_id: chat_id.to_string(),
            handle,
            queue: WorkspaceQueue::new(),
            gate_key,
            task_reader,
        }))
    }

    fn spawn_task_reader(&self, workspace: Workspace, chat_id: String, gate_key: GateKey, handle: Arc<WorkerHandle>) -> JoinHandle<()> {
        let router = Arc::clone(&self.task_router);
        tokio::spawn(async move {
            let fabric = handle.fabric().clone();
            let mut watcher = match TaskWatcher::new(fabric.clone()).await {
                Ok(w) => w,
                Err(e) => {
                    warn!(workspace = %workspace.folder, error = %e, "could not watch worker tasks dir");
                    return;
                },
            };
            loop {
                match watcher.next().await {
                    Ok(Some(request)) => match router.handle(&workspace, &gate_key, &chat_id, &request).await {
                        Ok(TaskOutcome::Responded(value)) => {
                            if let Err(e) = fabric.write_response(&request.request_id, &value).await {
                                warn!(workspace = %workspace.folder, error = %e, "failed to write task response");
                            }
                        },
                        Ok(TaskOutcome::Deferred) => {},
                        Err(e) => {
                            warn!(workspace = %workspace.folder, error = %e, "task routing failed, denying");
                            let _ = fabric
                                .write_response(&request.request_id, &serde_json::json!({"decision": "deny", "reason": "internal error"}))
                                .await;
                        },
                    },
                    Ok(None) => break,
                    Err(e) => {
                        warn!(workspace = %workspace.folder, error = %e, "tasks watcher error");
                        break;
                    },
                }
            }
        })
    }

    async fn drain_loop(self: Arc<Self>, session: Arc<LiveSession>) {
        loop {
            let Some(batch) = session.queue.take_batch().await else {
                session.queue.finish_drain();
                return;
            };
            if let Err(e) = session.handle.deliver(&batch).await {
                warn!(workspace = %session.workspace.folder, error = %e, "failed to deliver queued input");
                session.queue.finish_drain();
                return;
            }
            match session.handle.wait_for_turn_done().await {
                Some(token) => {
                    let record = Session::new(session.workspace.folder.clone(), SessionToken(token));
                    if let Err(e) = self.sessions_store.put(&record).await {
                        warn!(workspace = %session.workspace.folder, error = %e, "failed to persist session token");
                    }
                },
                None => {
                    warn!(workspace = %session.workspace.folder, "worker ended before completing its turn");
                    session.queue.finish_drain();
                    return;
                },
            }
        }
    }
}
