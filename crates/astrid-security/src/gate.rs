//! Policy evaluation (§4.D): combines per-invocation taint state, a
//! service's four trust bits, the secrets scanner, and the Cop into a
//! single [`Decision`].

use astrid_core::{Decision, ServiceTrustConfig, Taints};

use crate::cop::{Cop, CopVerdict};
use crate::scanner;
use crate::taint::{GateKey, TaintRegistry};

/// Whether an action reads from or writes to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Consults `public_source`/`secret_data`.
    Read,
    /// Consults `public_sink`/`dangerous_writes`, and runs the scanner.
    Write,
}

/// One action awaiting evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvalRequest<'a> {
    /// Name of the service being invoked, for audit and Cop summaries.
    pub service: &'a str,
    /// The service's declared trust bits.
    pub trust: ServiceTrustConfig,
    /// Read or write.
    pub kind: ActionKind,
    /// The payload being read or written — scanned on the write path.
    pub payload: &'a str,
    /// Admin workspaces short-circuit to allow.
    pub is_admin: bool,
}

/// The rendered decision plus the taint state it was evaluated against.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    /// The gate's decision.
    pub decision: Decision,
    /// Taint state after this evaluation (taints are applied even on
    /// `deny`, since the worker already observed whatever it observed).
    pub taints: Taints,
    /// Short human-readable explanation, for the audit log.
    pub reason: String,
    /// Whether the Cop was consulted for this evaluation.
    pub cop_invoked: bool,
}

/// Per-worker-invocation gate: owns the taint registry and the Cop used
/// for secondary scrutiny. One gate instance serves every invocation; the
/// registry keys state by `(workspace_folder, invocation_ts)` so distinct
/// invocations never see each other's taints.
pub struct SecurityGate<C: Cop> {
    registry: TaintRegistry,
    cop: C,
}

impl<C: Cop> SecurityGate<C> {
    /// Build a gate backed by `cop` for secondary scrutiny.
    #[must_use]
    pub fn new(cop: C) -> Self {
        Self {
            registry: TaintRegistry::new(),
            cop,
        }
    }

    /// Register a fresh invocation.
    pub fn register(&self, key: GateKey, pre_tainted_secret: bool) {
        self.registry.register(key, pre_tainted_secret);
    }

    /// Release an invocation's taint state.
    pub fn release(&self, key: &GateKey) {
        self.registry.release(key);
    }

    /// Current taint state for `key`.
    #[must_use]
    pub fn taints(&self, key: &GateKey) -> Taints {
        self.registry.get(key).unwrap_or_default()
    }

    /// Merge additional taint into `key`'s state. Exposed for callers that
    /// evaluate a sub-protocol outside [`SecurityGate::evaluate`] (the bash
    /// gate's local classification) but still need to record what the
    /// worker observed.
    pub fn taint(&self, key: &GateKey, additional: Taints) {
        self.registry.taint(key, additional);
    }

    /// The Cop backend this gate was built with, for sub-protocols (bash
    /// escalation) that consult it outside the generic read/write path.
    #[must_use]
    pub fn cop(&self) -> &C {
        &self.cop
    }

    /// Evaluate one action against the gate (§4.D steps 1-5).
    pub async fn evaluate(&self, key: &GateKey, req: EvalRequest<'_>) -> EvalOutcome {
        if req.is_admin {
            return EvalOutcome {
                decision: Decision::Allow,
                taints: self.taints(key),
                reason: "admin workspace short-circuits to allow".to_string(),
                cop_invoked: false,
            };
        }

        if req.trust.any_forbidden() {
            return EvalOutcome {
                decision: Decision::Deny,
                taints: self.taints(key),
                reason: format!("service {} has a forbidden trust bit", req.service),
                cop_invoked: false,
            };
        }

        match req.kind {
            ActionKind::Read => self.evaluate_read(key, &req),
            ActionKind::Write => self.evaluate_write(key, &req).await,
        }
    }

    fn evaluate_read(&self, key: &GateKey, req: &EvalRequest<'_>) -> EvalOutcome {
        let additional = Taints {
            corruption: req.trust.public_source.requires_scrutiny(),
            secret: req.trust.secret_data.requires_scrutiny(),
        };
        self.registry.taint(key, additional);
        EvalOutcome {
            decision: Decision::Allow,
            taints: self.taints(key),
            reason: "read path allowed, taints applied per trust bits".to_string(),
            cop_invoked: false,
        }
    }

    async fn evaluate_write(&self, key: &GateKey, req: &EvalRequest<'_>) -> EvalOutcome {
        let scanner_hit = scanner::contains_secret(req.payload);
        self.registry.taint(
            key,
            Taints {
                corruption: false,
                secret: scanner_hit,
            },
        );
        let taints = self.taints(key);

        if req.trust.public_sink.requires_scrutiny() && taints.secret {
            return EvalOutcome {
                decision: Decision::NeedsHuman,
                taints,
                reason: "lethal trifecta: secret-tainted invocation writing to a public sink".to_string(),
                cop_invoked: false,
            };
        }

        let needs_scrutiny = (req.trust.public_sink.requires_scrutiny() && taints.corruption)
            || (req.trust.dangerous_writes.requires_scrutiny() && !taints.is_clean());

        if !needs_scrutiny {
            return EvalOutcome {
                decision: Decision::Allow,
                taints,
                reason: "write path allowed, no scrutiny condition met".to_string(),
                cop_invoked: false,
            };
        }

        let summary = format!(
            "service={} corruption_tainted={} secret_tainted={} payload_bytes={}",
            req.service,
            taints.corruption,
            taints.secret,
            req.payload.len()
        );
        let CopVerdict { suspicious } = classify_fail_open(&self.cop, &summary).await;

        EvalOutcome {
            decision: if suspicious { Decision::NeedsHuman } else { Decision::Allow },
            taints,
            reason: if suspicious {
                "cop flagged the action under scrutiny".to_string()
            } else {
                "cop cleared the action under scrutiny".to_string()
            },
            cop_invoked: true,
        }
    }
}

async fn classify_fail_open<C: Cop>(cop: &C, summary: &str) -> CopVerdict {
    match cop.classify(summary).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(error = %e, "cop backend failed, failing open");
            CopVerdict::clear()
        },
    }
}

#[cfg(test)]
mod tests {
    use astrid_core::{InvocationTs, TrustBit, WorkspaceFolder};

    use super::*;
    use crate::cop::NullCop;

    fn key() -> GateKey {
        GateKey::new(WorkspaceFolder("w1".to_string()), InvocationTs(1))
    }

    fn trusted() -> ServiceTrustConfig {
        ServiceTrustConfig::trusted()
    }

    #[tokio::test]
    async fn admin_short_circuits_to_allow() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), false);
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "anything",
                    trust: ServiceTrustConfig {
                        dangerous_writes: TrustBit::Forbidden,
                        ..trusted()
                    },
                    kind: ActionKind::Write,
                    payload: "",
                    is_admin: true,
                },
            )
            .await;
        assert_eq!(outcome.decision, Decision::Allow);
    }

    #[tokio::test]
    async fn any_forbidden_bit_denies() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), false);
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "shell",
                    trust: ServiceTrustConfig {
                        dangerous_writes: TrustBit::Forbidden,
                        ..trusted()
                    },
                    kind: ActionKind::Write,
                    payload: "rm -rf /",
                    is_admin: false,
                },
            )
            .await;
        assert_eq!(outcome.decision, Decision::Deny);
    }

    #[tokio::test]
    async fn read_path_taints_without_denying() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), false);
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "web_fetch",
                    trust: ServiceTrustConfig {
                        public_source: TrustBit::RequiresScrutiny,
                        ..trusted()
                    },
                    kind: ActionKind::Read,
                    payload: "",
                    is_admin: false,
                },
            )
            .await;
        assert_eq!(outcome.decision, Decision::Allow);
        assert!(outcome.taints.corruption);
    }

    #[tokio::test]
    async fn lethal_trifecta_needs_human_without_cop() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), true); // pre-tainted secret
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "chat_send",
                    trust: ServiceTrustConfig {
                        public_sink: TrustBit::RequiresScrutiny,
                        ..trusted()
                    },
                    kind: ActionKind::Write,
                    payload: "totally normal message",
                    is_admin: false,
                },
            )
            .await;
        assert_eq!(outcome.decision, Decision::NeedsHuman);
        assert!(!outcome.cop_invoked);
    }

    #[tokio::test]
    async fn corruption_plus_public_sink_invokes_cop() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), false);
        gate.registry.taint(
            &key(),
            Taints {
                corruption: true,
                secret: false,
            },
        );
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "chat_send",
                    trust: ServiceTrustConfig {
                        public_sink: TrustBit::RequiresScrutiny,
                        ..trusted()
                    },
                    kind: ActionKind::Write,
                    payload: "hello",
                    is_admin: false,
                },
            )
            .await;
        assert!(outcome.cop_invoked);
        assert_eq!(outcome.decision, Decision::Allow);
    }

    #[tokio::test]
    async fn clean_write_is_allowed_without_scrutiny() {
        let gate = SecurityGate::new(NullCop);
        gate.register(key(), false);
        let outcome = gate
            .evaluate(
                &key(),
                EvalRequest {
                    service: "notes",
                    trust: trusted(),
                    kind: ActionKind::Write,
                    payload: "just some notes",
                    is_admin: false,
                },
            )
            .await;
        assert_eq!(outcome.decision, Decision::Allow);
        assert!(!outcome.cop_invoked);
    }
}
