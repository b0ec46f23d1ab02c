//! Per-invocation taint registry (§4.D).
//!
//! The gate is instantiated once per worker invocation, keyed by
//! `(workspace_folder, invocation_ts)`, and destroyed when the worker
//! process releases. Taints are monotonic during the invocation and never
//! cross invocations — [`TaintRegistry::release`] drops the entry entirely
//! rather than resetting it, so a stale key can never be read back.

use astrid_core::{InvocationTs, Taints, WorkspaceFolder};
use dashmap::DashMap;

/// Identifies one worker invocation's gate state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GateKey {
    /// The workspace the invocation belongs to.
    pub workspace_folder: WorkspaceFolder,
    /// Monotonic identifier for this specific invocation.
    pub invocation_ts: InvocationTs,
}

impl GateKey {
    /// Build a key for `(workspace_folder, invocation_ts)`.
    #[must_use]
    pub fn new(workspace_folder: WorkspaceFolder, invocation_ts: InvocationTs) -> Self {
        Self {
            workspace_folder,
            invocation_ts,
        }
    }
}

/// Live taint state for every currently-running worker invocation.
#[derive(Debug, Default)]
pub struct TaintRegistry {
    taints: DashMap<GateKey, Taints>,
}

impl TaintRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh invocation, pre-tainted per the workspace's
    /// `contains_secrets` declaration.
    pub fn register(&self, key: GateKey, pre_tainted_secret: bool) {
        self.taints.insert(
            key,
            Taints {
                corruption: false,
                secret: pre_tainted_secret,
            },
        );
    }

    /// Current taint state for `key`, if the invocation is still live.
    #[must_use]
    pub fn get(&self, key: &GateKey) -> Option<Taints> {
        self.taints.get(key).map(|entry| *entry.value())
    }

    /// Merge additional taint bits into `key`'s state. Monotonic: bits
    /// already set stay set. No-op if the invocation isn't registered.
    pub fn taint(&self, key: &GateKey, additional: Taints) {
        if let Some(mut entry) = self.taints.get_mut(key) {
            *entry = entry.merge(additional);
        }
    }

    /// Drop all taint state for `key`. Called when the worker process
    /// releases; a later invocation with the same workspace gets a fresh
    /// key (a new `invocation_ts`) and so never observes this state.
    pub fn release(&self, key: &GateKey) {
        self.taints.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::WorkspaceFolder;

    use super::*;

    fn key() -> GateKey {
        GateKey::new(WorkspaceFolder("w1".to_string()), InvocationTs(1))
    }

    #[test]
    fn taints_are_monotonic() {
        let registry = TaintRegistry::new();
        registry.register(key(), false);
        registry.taint(
            &key(),
            Taints {
                corruption: true,
                secret: false,
            },
        );
        registry.taint(
            &key(),
            Taints {
                corruption: false,
                secret: false,
            },
        );
        let state = registry.get(&key()).unwrap();
        assert!(state.corruption);
        assert!(!state.secret);
    }

    #[test]
    fn release_removes_all_state() {
        let registry = TaintRegistry::new();
        registry.register(key(), true);
        assert!(registry.get(&key()).is_some());
        registry.release(&key());
        assert!(registry.get(&key()).is_none());
    }

    #[test]
    fn pre_taint_sets_secret_at_spawn() {
        let registry = TaintRegistry::new();
        registry.register(key(), true);
        assert!(registry.get(&key()).unwrap().secret);
    }
}
