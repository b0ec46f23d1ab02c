//! The real [`OutputSink`] implementation, wiring worker output to the
//! outbound message bus (§4.G outbound pipeline). `astrid-runtime` only
//! ships [`astrid_runtime::NullOutputSink`] — its own doc comment says the
//! composition root supplies the real one.

use std::sync::Arc;

use astrid_core::WorkspaceFolder;
use astrid_events::MessageBus;
use astrid_ipc::OutputEvent;
use astrid_runtime::OutputSink;
use async_trait::async_trait;
use tracing::debug;

/// Forwards `text` chunks and turn-completion to the bus. Per the
/// workspace-folder-is-the-canonical-chat-id convention this host applies
/// throughout (see `DESIGN.md`), the chat id a sink publishes to is simply
/// the workspace folder's string form.
pub struct BusOutputSink {
    bus: Arc<MessageBus>,
}

impl BusOutputSink {
    /// Wrap a bus for use as a worker session's output sink.
    #[must_use]
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl OutputSink for BusOutputSink {
    async fn on_output(&self, workspace: &WorkspaceFolder, event: OutputEvent) {
        let chat_id = workspace.0.as_str();
        let is_pulse = event.is_query_done_pulse();

        match event {
            OutputEvent::Text { text } => {
                self.bus.publish_text(chat_id, &text).await;
            },
            OutputEvent::Result { result, .. } => {
                let had_result = result.is_some();
                if let Some(text) = result.filter(|text| !text.is_empty()) {
                    self.bus.publish_text(chat_id, &text).await;
                }
                if is_pulse || had_result {
                    self.bus.end_turn(chat_id).await;
                }
            },
            OutputEvent::Thinking { text } => {
                debug!(workspace = %workspace, text, "worker thinking (not surfaced)");
            },
            OutputEvent::ToolUse { name, input } => {
                debug!(workspace = %workspace, tool = name, ?input, "worker tool use (not surfaced)");
            },
            OutputEvent::ToolResult { content } => {
                debug!(workspace = %workspace, ?content, "worker tool result (not surfaced)");
            },
            OutputEvent::System { message } => {
                debug!(workspace = %workspace, message, "worker system event (not surfaced)");
            },
        }
    }

    async fn on_stderr(&self, workspace: &WorkspaceFolder, chunk: &str) {
        tracing::warn!(workspace = %workspace, stderr = chunk, "worker stderr");
    }
}
