//! Workspace entity and its security policy (§3 `Workspace`, `WorkspaceSecurity`,
//! `ServiceTrustConfig`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::WorkspaceFolder;

/// One of the four independent trust bits on a [`ServiceTrustConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBit {
    /// Trusted — the operation proceeds without tainting the gate.
    Trusted,
    /// Requires scrutiny — the matching taint is set (or escalation applies).
    RequiresScrutiny,
    /// Never permitted for this service, regardless of taint state.
    Forbidden,
}

impl TrustBit {
    /// `true` when scrutiny is required for this bit.
    #[must_use]
    pub fn requires_scrutiny(self) -> bool {
        matches!(self, Self::RequiresScrutiny)
    }

    /// `true` when this bit forbids the action outright.
    #[must_use]
    pub fn is_forbidden(self) -> bool {
        matches!(self, Self::Forbidden)
    }
}

/// The four independent policy bits declared per service (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTrustConfig {
    /// Returns untrusted content (sets corruption taint on read).
    pub public_source: TrustBit,
    /// Returns privileged data (sets secret taint on read).
    pub secret_data: TrustBit,
    /// Writes externally observable data.
    pub public_sink: TrustBit,
    /// Mutates durable state.
    pub dangerous_writes: TrustBit,
}

impl ServiceTrustConfig {
    /// A fully trusted service — every bit `Trusted`.
    #[must_use]
    pub fn trusted() -> Self {
        Self {
            public_source: TrustBit::Trusted,
            secret_data: TrustBit::Trusted,
            public_sink: TrustBit::Trusted,
            dangerous_writes: TrustBit::Trusted,
        }
    }

    /// `true` if any bit is `Forbidden`.
    #[must_use]
    pub fn any_forbidden(&self) -> bool {
        self.public_source.is_forbidden()
            || self.secret_data.is_forbidden()
            || self.public_sink.is_forbidden()
            || self.dangerous_writes.is_forbidden()
    }
}

/// A workspace's security posture (§3 `WorkspaceSecurity`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSecurity {
    /// Per-service trust declarations, keyed by service name.
    #[serde(default)]
    pub services: HashMap<String, ServiceTrustConfig>,
    /// Pre-taints the secret channel at worker spawn when `true`.
    #[serde(default)]
    pub contains_secrets: bool,
}

impl WorkspaceSecurity {
    /// Look up the trust config for a service, defaulting to fully trusted
    /// for services the workspace never declared (unknown services are not
    /// automatically dangerous — an operator who enables a new service must
    /// explicitly restrict it).
    #[must_use]
    pub fn service(&self, name: &str) -> ServiceTrustConfig {
        self.services
            .get(name)
            .copied()
            .unwrap_or_else(ServiceTrustConfig::trusted)
    }
}

/// The unit of isolation and policy (§3 `Workspace`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Canonical address (stable string).
    pub id: crate::ids::WorkspaceId,
    /// Display name.
    pub name: String,
    /// Filesystem slug, unique across workspaces.
    pub folder: WorkspaceFolder,
    /// Pattern that activates the agent on inbound text.
    pub trigger: String,
    /// Admin workspaces skip policy gates and see all tasks/jobs.
    pub is_admin: bool,
    /// Security posture.
    pub security: WorkspaceSecurity,
    /// Opaque blob passed to worker spawn (container/runtime config).
    pub container_config: serde_json::Value,
}

impl Workspace {
    /// Create a minimal non-admin workspace with trusted-by-default security.
    #[must_use]
    pub fn new(
        id: impl Into<crate::ids::WorkspaceId>,
        name: impl Into<String>,
        folder: WorkspaceFolder,
        trigger: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder,
            trigger: trigger.into(),
            is_admin: false,
            security: WorkspaceSecurity::default(),
            container_config: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_defaults_to_trusted() {
        let security = WorkspaceSecurity::default();
        let cfg = security.service("anything");
        assert_eq!(cfg.public_source, TrustBit::Trusted);
        assert!(!cfg.any_forbidden());
    }

    #[test]
    fn any_forbidden_detects_single_forbidden_bit() {
        let mut cfg = ServiceTrustConfig::trusted();
        cfg.dangerous_writes = TrustBit::Forbidden;
        assert!(cfg.any_forbidden());
    }
}
