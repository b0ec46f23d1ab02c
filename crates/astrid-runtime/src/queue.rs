//! Per-workspace execution queue (§4.F): serializes delivery to a worker
//! so concurrent chat messages land as one ordered turn instead of
//! racing each other into `input/`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

/// Backlog of not-yet-delivered input for one workspace, plus whether a
/// drain loop currently owns delivering it.
#[derive(Default)]
pub struct WorkspaceQueue {
    pending: Mutex<VecDeque<String>>,
    draining: AtomicBool,
}

impl WorkspaceQueue {
    /// An empty, idle queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` to the backlog.
    pub async fn push(&self, text: String) {
        self.pending.lock().await.push_back(text);
    }

    /// Claim ownership of draining this queue. Returns `true` if the
    /// caller is now the (only) drain owner; `false` if another drain
    /// loop already owns it and will pick up this push on its next pass.
    pub fn try_start_drain(&self) -> bool {
        !self.draining.swap(true, Ordering::AcqRel)
    }

    /// Release drain ownership. Must be called exactly once by whichever
    /// caller's `try_start_drain` returned `true`.
    pub fn finish_drain(&self) {
        self.draining.store(false, Ordering::Release);
    }

    /// `true` while a drain loop owns this queue.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Take everything currently pending, concatenated in arrival order
    /// and separated by newlines (§4.F "concatenating pending payloads in
    /// arrival order"). `None` if nothing is pending.
    pub async fn take_batch(&self) -> Option<String> {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return None;
        }
        Some(pending.drain(..).collect::<Vec<_>>().join("\n"))
    }

    /// Drop every not-yet-delivered message (§4.G `interrupt`). A turn
    /// already handed to the worker keeps running; there is no mid-turn
    /// cancellation primitive in the IPC fabric.
    pub async fn clear(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    /// `true` if the backlog is non-empty.
    pub async fn has_pending(&self) -> bool {
        !self.pending.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_pushes_join_in_arrival_order() {
        let queue = WorkspaceQueue::new();
        queue.push("first".to_string()).await;
        queue.push("second".to_string()).await;
        assert_eq!(queue.take_batch().await, Some("first\nsecond".to_string()));
        assert_eq!(queue.take_batch().await, None);
    }

    #[test]
    fn only_one_caller_claims_drain_ownership() {
        let queue = WorkspaceQueue::new();
        assert!(queue.try_start_drain());
        assert!(!queue.try_start_drain());
        queue.finish_drain();
        assert!(queue.try_start_drain());
    }

    #[tokio::test]
    async fn clear_drops_the_backlog_and_reports_the_count() {
        let queue = WorkspaceQueue::new();
        queue.push("a".to_string()).await;
        queue.push("b".to_string()).await;
        assert_eq!(queue.clear().await, 2);
        assert!(!queue.has_pending().await);
    }
}
