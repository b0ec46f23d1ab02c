//! Host-side consumer of a worker's output stream (§4.E "dedicated reader
//! task ... forwarding to output handler").
//!
//! Concrete fan-out to chat channels lives in `astrid-events::MessageBus`,
//! which this crate does not depend on directly — the session manager only
//! needs *something* that accepts [`astrid_ipc::OutputEvent`]s per
//! workspace. The composition root (`astrid-kernel`) supplies the real
//! implementation.

use astrid_core::WorkspaceFolder;
use astrid_ipc::OutputEvent;
use async_trait::async_trait;

/// Receives every output event a worker emits, as it emits it.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Handle one output event for `workspace`.
    async fn on_output(&self, workspace: &WorkspaceFolder, event: OutputEvent);

    /// Handle a chunk of the worker's stderr stream. Called whenever the
    /// bounded stderr buffer is flushed (on process exit, or when the
    /// buffer fills and truncates).
    async fn on_stderr(&self, workspace: &WorkspaceFolder, chunk: &str) {
        let _ = (workspace, chunk);
    }
}

/// An [`OutputSink`] that discards everything. Useful in tests that only
/// care about queue/session bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutputSink;

#[async_trait]
impl OutputSink for NullOutputSink {
    async fn on_output(&self, _workspace: &WorkspaceFolder, _event: OutputEvent) {}
}
