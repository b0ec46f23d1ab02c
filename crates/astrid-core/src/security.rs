//! Shared vocabulary for security-gate decisions (§4.D), kept here so both
//! `astrid-security` and `astrid-audit` can depend on the same types without
//! depending on each other.

use serde::{Deserialize, Serialize};

/// The outcome of evaluating a privileged action against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Proceed with the action.
    Allow,
    /// Refuse the action outright and audit the refusal.
    Deny,
    /// Suspend the action behind a [`crate::channel::Question`]-style human
    /// approval before it may proceed.
    NeedsHuman,
}

impl Decision {
    /// `true` for [`Decision::Allow`].
    #[must_use]
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// `true` for [`Decision::NeedsHuman`].
    #[must_use]
    pub fn needs_human(self) -> bool {
        matches!(self, Self::NeedsHuman)
    }
}

/// The two sticky, monotonic taints tracked per worker invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taints {
    /// The worker has observed untrusted content (`public_source = true`).
    pub corruption: bool,
    /// The worker has observed privileged data (`secret_data = true`, or
    /// the workspace declared `contains_secrets` at spawn).
    pub secret: bool,
}

impl Taints {
    /// No taints set.
    #[must_use]
    pub fn clean() -> Self {
        Self::default()
    }

    /// Taints never clear during an invocation; merge keeps anything
    /// already set.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            corruption: self.corruption || other.corruption,
            secret: self.secret || other.secret,
        }
    }

    /// `true` if both taints are set — the "lethal trifecta" precondition
    /// once paired with a `public_sink` write.
    #[must_use]
    pub fn both(self) -> bool {
        self.corruption && self.secret
    }

    /// `true` if neither taint is set.
    #[must_use]
    pub fn is_clean(self) -> bool {
        !self.corruption && !self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_monotonic() {
        let a = Taints {
            corruption: true,
            secret: false,
        };
        let b = Taints {
            corruption: false,
            secret: true,
        };
        let merged = a.merge(b);
        assert!(merged.both());
    }
}
