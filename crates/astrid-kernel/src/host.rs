//! The composition root (§9 "model as a small explicit `Host` value
//! constructed at startup and passed to components"): wires every other
//! crate's pieces together and drives the inbound/outbound pipelines, the
//! scheduler, and deploy/lifecycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use astrid_approval::{cold_path_context, ApprovalDecision, AwaitOutcome};
use astrid_config::HostConfig;
use astrid_core::{Channel, Direction, Message, MessageId, Session, SessionToken, Timestamp, Workspace, WorkspaceFolder};
use astrid_events::{detect_reaction, CommandWords, InboundOutcome, InboundRouter, MagicCommand, MessageBus, ReactionKind};
use astrid_fs::list_ordered;
use astrid_ipc::IpcFabric;
use astrid_runtime::{SessionManager, TaskRouter, WorkerSpawner};
use astrid_scheduler::Scheduler;
use astrid_security::SecurityGate;
use astrid_storage::Store;
use astrid_workspace::WorkspaceLayout;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::cop::ConfiguredCop;
use crate::deploy::{self, DeployContinuation};
use crate::error::{KernelError, KernelResult};
use crate::output::BusOutputSink;

/// Everything a running host needs, built once at startup.
pub struct Host<S: WorkerSpawner + 'static> {
    config: HostConfig,
    store: Store,
    layout: WorkspaceLayout,
    approvals: Arc<astrid_approval::ApprovalManager>,
    questions: Arc<astrid_approval::QuestionManager>,
    task_router: Arc<TaskRouter<ConfiguredCop>>,
    sessions: Arc<SessionManager<ConfiguredCop, S>>,
    scheduler: Arc<Scheduler<ConfiguredCop, S>>,
    audit: astrid_audit::AuditLog,
    bus: Arc<MessageBus>,
    inbound: InboundRouter,
    shutdown: Arc<Notify>,
}

impl<S: WorkerSpawner + 'static> Host<S> {
    /// Build the host from loaded configuration, a concrete worker spawner,
    /// and the connected channels. Opens (or creates) the data root's state
    /// store and IPC tree; does not yet run anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the state store cannot be opened.
    pub async fn new(config: HostConfig, spawner: S, channels: Vec<Arc<dyn Channel>>) -> KernelResult<Self> {
        let db_path = config.data_root.join("db");
        let store = Store::open(&db_path.to_string_lossy()).await?;
        let layout = WorkspaceLayout::new(config.data_root.clone());

        let cop = ConfiguredCop::from_config(&config.security);
        let gate = Arc::new(SecurityGate::new(cop));
        let approvals = Arc::new(astrid_approval::ApprovalManager::new(layout.ipc_root()));
        let questions = Arc::new(astrid_approval::QuestionManager::new(layout.ipc_root()));
        let task_router = Arc::new(TaskRouter::new(
            gate.clone(),
            approvals.clone(),
            questions.clone(),
            Duration::from_secs(config.security.approval_timeout_seconds),
        ));

        let bus = Arc::new(MessageBus::new(channels));
        let sink = Arc::new(BusOutputSink::new(bus.clone()));

        let sessions = Arc::new(SessionManager::new(
            Arc::new(spawner),
            layout.clone(),
            sink,
            gate.clone(),
            task_router.clone(),
            store.sessions.clone(),
            config.worker,
        ));

        let scheduler = Arc::new(Scheduler::new(
            store.schedule.clone(),
            store.workspaces.clone(),
            sessions.clone(),
            config.scheduler.clone(),
        ));

        let audit = astrid_audit::AuditLog::new(config.data_root.join("audit"));

        let words = CommandWords {
            reset: config.commands.reset_words.clone(),
            end_session: config.commands.end_session_words.clone(),
            redeploy: config.commands.redeploy_words.clone(),
        };
        let inbound = InboundRouter::new(words);

        Ok(Self {
            config,
            store,
            layout,
            approvals,
            questions,
            task_router,
            sessions,
            scheduler,
            audit,
            bus,
            inbound,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Run the host until an external shutdown signal or an internal
    /// redeploy request. Spawns the scheduler ticker and the idle-eviction
    /// sweep, replays any deploy continuation left by a prior process, then
    /// blocks until told to stop.
    ///
    /// There is no `libc`/`nix` dependency in this workspace, so a
    /// self-initiated redeploy cannot literally re-deliver its own SIGTERM
    /// the way the original host does (`os.kill(os.getpid(), SIGTERM)`).
    /// Instead `redeploy` (see below) notifies `self.shutdown` directly,
    /// while real operator-issued signals are still honored via
    /// `tokio::signal::unix` — see `DESIGN.md`.
    ///
    /// # Errors
    ///
    /// Returns an error if continuation resume fails, or if registering
    /// the unix signal handlers fails.
    pub async fn run(self: Arc<Self>) -> KernelResult<()> {
        let scheduler_handle = tokio::spawn(Arc::clone(&self.scheduler).run());
        let idle_handle = tokio::spawn(Arc::clone(&self.sessions).idle_sweep(Duration::from_secs(self.config.worker.idle_timeout_seconds)));

        self.resume_from_continuation().await?;

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = self.shutdown.notified() => info!("shutdown requested (redeploy or admin command)"),
        }

        scheduler_handle.abort();
        idle_handle.abort();
        Ok(())
    }

    /// Replay `deploy_continuation.json` if one was left by a prior process
    /// (§4.K point 4): rehydrate every active session token and show a
    /// resume notice in the originating chat.
    async fn resume_from_continuation(&self) -> KernelResult<()> {
        let Some(continuation) = deploy::load_and_consume_continuation(&self.config.data_root).await? else {
            return Ok(());
        };

        for (folder, token) in &continuation.active_sessions {
            let session = Session::new(WorkspaceFolder(folder.clone()), SessionToken(token.clone()));
            self.store.sessions.put(&session).await?;
        }

        if !continuation.chat_id.is_empty() {
            self.publish_host_notice(&continuation.chat_id, &continuation.resume_prompt).await;
        }
        Ok(())
    }

    /// Process one inbound chat message (§4.G inbound pipeline, steps 1-5).
    ///
    /// # Errors
    ///
    /// Returns an error if the message store, workspace lookup, or a
    /// dispatched magic command's side effect fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_inbound(
        &self,
        channel: &str,
        chat_id_on_channel: &str,
        platform_message_id: &str,
        sender: &str,
        sender_name: Option<&str>,
        raw_text: &str,
        effective_text: &str,
    ) -> KernelResult<()> {
        let outcome = self
            .inbound
            .route(&self.store, channel, chat_id_on_channel, platform_message_id, sender, sender_name, raw_text, effective_text)
            .await?;

        match outcome {
            InboundOutcome::Duplicate => {
                info!(channel, platform_message_id, "duplicate inbound message ignored");
            },
            InboundOutcome::Command(command) => {
                let canonical_chat_id = self.inbound.resolve_chat_id(channel, chat_id_on_channel);
                self.handle_magic_command(&canonical_chat_id, command).await?;
            },
            InboundOutcome::Enqueue { canonical_chat_id, text } => {
                self.enqueue_on_workspace(&canonical_chat_id, text).await?;
            },
        }
        Ok(())
    }

    /// Resolve a reaction emoji on a previously sent message to its effect
    /// (§4.G step 5): `eyes` is a no-op recheck hint, `x` interrupts the
    /// active worker.
    pub async fn handle_reaction(&self, canonical_chat_id: &str, emoji: &str) -> KernelResult<()> {
        match detect_reaction(emoji) {
            Some(ReactionKind::Interrupt) => {
                let workspace = self.require_workspace(canonical_chat_id).await?;
                let dropped = self.sessions.interrupt(&workspace.folder).await;
                info!(workspace = %workspace.folder, dropped, "interrupted by reaction");
            },
            Some(ReactionKind::Recheck) | None => {},
        }
        Ok(())
    }

    async fn enqueue_on_workspace(&self, canonical_chat_id: &str, text: String) -> KernelResult<()> {
        let workspace = self.require_workspace(canonical_chat_id).await?;
        self.sessions.enqueue(&workspace, canonical_chat_id, text).await?;
        Ok(())
    }

    async fn handle_magic_command(&self, canonical_chat_id: &str, command: MagicCommand) -> KernelResult<()> {
        match command {
            MagicCommand::Reset => self.reset(canonical_chat_id).await,
            MagicCommand::EndSession => self.end_session(canonical_chat_id).await,
            MagicCommand::Redeploy => self.redeploy_from_chat(canonical_chat_id).await,
            MagicCommand::Approve(short_id) => self.resolve_approval(&short_id, true).await,
            MagicCommand::Deny(short_id) => self.resolve_approval(&short_id, false).await,
            MagicCommand::PendingList => self.pending_list(canonical_chat_id).await,
        }
    }

    /// `reset` (§6 scenario 2): stop the worker, drop its session token, so
    /// the next message starts a fresh context.
    async fn reset(&self, canonical_chat_id: &str) -> KernelResult<()> {
        let workspace = self.require_workspace(canonical_chat_id).await?;
        self.sessions.stop(&workspace.folder).await?;
        self.store.sessions.clear(&workspace.folder).await?;
        self.publish_host_notice(canonical_chat_id, "Session reset. Starting fresh next message.").await;
        Ok(())
    }

    /// `end-session`: stop the worker but keep the session token/history.
    async fn end_session(&self, canonical_chat_id: &str) -> KernelResult<()> {
        let workspace = self.require_workspace(canonical_chat_id).await?;
        self.sessions.stop(&workspace.folder).await?;
        self.publish_host_notice(canonical_chat_id, "Session ended.").await;
        Ok(())
    }

    /// `redeploy` issued from chat, gated on `commands.allow_chat_redeploy`.
    /// This host does not rebuild a container image itself (§4.K point 1,
    /// "rebuild the worker image", is an external build-pipeline concern
    /// out of scope for this crate — see `DESIGN.md`); it writes the
    /// continuation, notifies the chat, and triggers shutdown so an outer
    /// supervisor can restart the process against the already-rebuilt image.
    async fn redeploy_from_chat(&self, canonical_chat_id: &str) -> KernelResult<()> {
        if !self.config.commands.allow_chat_redeploy {
            self.publish_host_notice(canonical_chat_id, "Redeploy from chat is disabled.").await;
            return Ok(());
        }
        self.redeploy(canonical_chat_id, "unknown", "unknown", "Deploy complete. Verifying service health.")
            .await
    }

    /// Write a deploy continuation covering every workspace with a live
    /// session, notify the originating chat, and request shutdown
    /// (§4.K points 2-3).
    ///
    /// # Errors
    ///
    /// Returns an error if the continuation file cannot be written or the
    /// workspace/session listing fails.
    pub async fn redeploy(&self, canonical_chat_id: &str, commit_sha: &str, previous_sha: &str, resume_prompt: &str) -> KernelResult<()> {
        let mut active_sessions = HashMap::new();
        for workspace in self.store.workspaces.list().await? {
            if let Some(session) = self.store.sessions.get(&workspace.folder).await? {
                active_sessions.insert(workspace.folder.0, session.token.0);
            }
        }

        let continuation = DeployContinuation {
            chat_id: canonical_chat_id.to_string(),
            session_id: active_sessions.get(canonical_chat_id).cloned().unwrap_or_default(),
            resume_prompt: resume_prompt.to_string(),
            commit_sha: commit_sha.to_string(),
            previous_commit_sha: previous_sha.to_string(),
            active_sessions,
        };
        deploy::write_continuation(&self.config.data_root, &continuation).await?;

        let short_sha = commit_sha.get(..8).unwrap_or(commit_sha);
        self.publish_host_notice(canonical_chat_id, &format!("Deploying {short_sha}... restarting now.")).await;

        self.shutdown.notify_one();
        Ok(())
    }

    /// `approve <short_id>` / `deny <short_id>` (§4.I). Resolves the short
    /// id across every workspace's `pending_approvals/`, writes the
    /// decision, and audits it. The worker's own wait loop (driven by
    /// `TaskRouter::handle`'s `escalate_to_human`) picks the decision up and
    /// writes the response.
    async fn resolve_approval(&self, short_id: &str, approve: bool) -> KernelResult<()> {
        let (workspace_folder, approval) =
            self.approvals.resolve_short_id(short_id).await.map_err(|_| KernelError::NoSuchPending(short_id.to_string()))?;

        let decision = if approve { ApprovalDecision::Approve } else { ApprovalDecision::Deny { reason: "Denied by user".to_string() } };
        self.approvals.write_decision(&workspace_folder, &approval.request_id, &decision).await?;

        self.audit
            .record(&astrid_core::AuditEvent::new(
                if decision.is_approved() { astrid_core::Decision::Allow } else { astrid_core::Decision::Deny },
                approval.tool_name.clone(),
                workspace_folder.clone(),
                astrid_core::Taints::clean(),
                "human decision via chat command",
            ))
            .await?;

        self.publish_host_notice(&approval.chat_id, &format!("{} {short_id}.", if approve { "Approved" } else { "Denied" })).await;
        Ok(())
    }

    /// `pending` (§6, §7 "the `pending` command's listing"): list every
    /// outstanding approval for the requesting workspace and its short id.
    async fn pending_list(&self, canonical_chat_id: &str) -> KernelResult<()> {
        let workspace = self.require_workspace(canonical_chat_id).await?;
        let pending_dir = self.layout.ipc_dir(&workspace.folder)?.join("pending_approvals");
        let files = list_ordered(&pending_dir).await.unwrap_or_default();

        if files.is_empty() {
            self.publish_host_notice(canonical_chat_id, "No pending approvals.").await;
            return Ok(());
        }

        let mut lines = vec!["Pending approvals:".to_string()];
        for path in files {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                lines.push(format!("- {stem}"));
            }
        }
        self.publish_host_notice(canonical_chat_id, &lines.join("\n")).await;
        Ok(())
    }

    /// Deliver a chat reply to a pending `ask_user` question (§4.I "On
    /// reply"). Warm path: the question's session is still alive, so the
    /// answer is written as an IPC response and the worker unblocks where
    /// it was. Cold path: the worker has exited, so the Q&A is rendered as
    /// context and enqueued as a normal message for the next cold start.
    ///
    /// `astrid-approval::QuestionManager` exposes no "list pending
    /// questions for a workspace" operation (only get-by-request-id), so
    /// this scans `pending_questions/` directly using the same directory
    /// name `QuestionManager` uses internally — see `DESIGN.md` for why
    /// this duplication was chosen over modifying that crate.
    ///
    /// # Errors
    ///
    /// Returns an error if no pending question exists for the workspace, or
    /// if answering it fails.
    pub async fn answer_question(&self, canonical_chat_id: &str, answers: Vec<String>) -> KernelResult<()> {
        let workspace = self.require_workspace(canonical_chat_id).await?;
        let pending_dir = self.layout.ipc_dir(&workspace.folder)?.join("pending_questions");
        let files = list_ordered(&pending_dir).await.unwrap_or_default();

        let Some(path) = files.into_iter().next_back() else {
            return Err(KernelError::NoSuchPending(canonical_chat_id.to_string()));
        };
        let raw = tokio::fs::read_to_string(&path).await.map_err(|source| astrid_fs::FsError::Io { path: path.clone(), source })?;
        let question: astrid_approval::PendingQuestion =
            serde_json::from_str(&raw).map_err(|source| astrid_fs::FsError::Deserialize { path: path.clone(), source })?;

        if self.sessions.is_active(&workspace.folder) {
            let fabric = IpcFabric::new(self.layout.ipc_dir(&workspace.folder)?);
            self.task_router.answer_question(&fabric, &workspace.folder.0, &question.request_id, answers).await?;
        } else {
            let pairs: Vec<(String, String)> =
                question.questions.iter().zip(answers.iter()).map(|(q, a)| (q.text.clone(), a.clone())).collect();
            let context = cold_path_context(&question, &pairs);
            self.questions.clear(&workspace.folder.0, &question.request_id).await?;
            self.sessions.enqueue(&workspace, canonical_chat_id, context).await?;
        }
        Ok(())
    }

    async fn require_workspace(&self, canonical_chat_id: &str) -> KernelResult<Workspace> {
        self.store
            .workspaces
            .find_by_folder(canonical_chat_id)
            .await?
            .ok_or_else(|| KernelError::NoSuchWorkspace(canonical_chat_id.to_string()))
    }

    /// Broadcast a host-originated notice and persist it as history (§4.G
    /// "Host-originated notifications ... follow the same bus but are
    /// labelled with a distinct sender and persisted as history").
    async fn publish_host_notice(&self, canonical_chat_id: &str, text: &str) {
        self.bus.publish_host_notice(canonical_chat_id, text).await;
        let message = Message::new(
            MessageId(format!("host:{}", Timestamp::now())),
            canonical_chat_id,
            "host",
            text,
            Direction::HostNotice,
        );
        if let Err(e) = self.store.messages.put(&message).await {
            warn!(error = %e, "failed to persist host notice");
        }
    }

    /// The state store, for callers (e.g. the CLI's `auth-<channel>` verbs)
    /// that need to register a workspace before the host starts routing.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Ask the host to stop, as if an operator sent SIGTERM.
    pub fn trigger_shutdown(&self) {
        self.shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_workspace(folder: &str) -> Workspace {
        Workspace::new(folder.to_string(), folder.to_string(), WorkspaceFolder(folder.to_string()), "!agent")
    }

    #[tokio::test]
    async fn require_workspace_errors_when_the_folder_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostConfig::default();
        config.data_root = dir.path().to_path_buf();
        let host = Host::new(config, astrid_test::FakeSpawner::default(), vec![]).await.unwrap();

        let err = host.require_workspace("nobody").await.unwrap_err();
        assert!(matches!(err, KernelError::NoSuchWorkspace(_)));
    }

    #[tokio::test]
    async fn require_workspace_resolves_an_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostConfig::default();
        config.data_root = dir.path().to_path_buf();
        let host = Host::new(config, astrid_test::FakeSpawner::default(), vec![]).await.unwrap();

        host.store.workspaces.put(&sample_workspace("acme")).await.unwrap();
        let resolved = host.require_workspace("acme").await.unwrap();
        assert_eq!(resolved.folder.0, "acme");
    }
}
