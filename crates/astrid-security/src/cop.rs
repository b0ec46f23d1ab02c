//! The Cop: a deterministic-input wrapper around an auxiliary LLM that
//! renders a suspicion verdict on a short, concrete action summary (§4.J).
//!
//! The Cop sees only a summary the gate constructs — never raw tool
//! payloads — so it cannot itself be prompt-injected by content the
//! worker observed. It fails open: any transport or contract error is
//! treated as "not suspicious", because the Cop is a second opinion layered
//! on top of the deterministic gate, not the sole safeguard.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::{SecurityError, SecurityResult};

/// The Cop's verdict on one action summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopVerdict {
    /// `true` if the Cop judged the action suspicious.
    pub suspicious: bool,
}

impl CopVerdict {
    /// A clean verdict, used as the fail-open default.
    #[must_use]
    pub fn clear() -> Self {
        Self { suspicious: false }
    }
}

/// Backend that renders a suspicion verdict for a short action summary.
#[async_trait]
pub trait Cop: Send + Sync {
    /// Classify `summary`. Implementations should return an error rather
    /// than guess on transport failure — [`FailOpenCop`] handles turning
    /// that into a safe default.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or violates its
    /// response contract.
    async fn classify(&self, summary: &str) -> SecurityResult<CopVerdict>;
}

#[derive(Deserialize)]
struct CopResponse {
    suspicious: bool,
}

/// Calls a configured HTTP endpoint expected to return
/// `{"suspicious": bool}` for a posted `{"summary": string}`.
pub struct HttpCop {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCop {
    /// Build a Cop backend that POSTs summaries to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Cop for HttpCop {
    async fn classify(&self, summary: &str) -> SecurityResult<CopVerdict> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "summary": summary }))
            .send()
            .await
            .map_err(|e| SecurityError::CopTransport(e.to_string()))?;

        let parsed: CopResponse = response
            .json()
            .await
            .map_err(|e| SecurityError::CopContractViolation(e.to_string()))?;

        Ok(CopVerdict {
            suspicious: parsed.suspicious,
        })
    }
}

/// A Cop that never flags anything. Used when `security.cop_enabled` is
/// `false` in configuration, or in tests that don't exercise escalation.
pub struct NullCop;

#[async_trait]
impl Cop for NullCop {
    async fn classify(&self, _summary: &str) -> SecurityResult<CopVerdict> {
        Ok(CopVerdict::clear())
    }
}

/// Wraps any [`Cop`] so that a transport or contract failure degrades to
/// [`CopVerdict::clear`] instead of propagating — the gate's escalation
/// path must never itself become a denial-of-service vector.
pub struct FailOpenCop<C: Cop> {
    inner: C,
}

impl<C: Cop> FailOpenCop<C> {
    /// Wrap `inner` with fail-open semantics.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Classify `summary`, returning a clear verdict on any backend error.
    pub async fn classify(&self, summary: &str) -> CopVerdict {
        match self.inner.classify(summary).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "cop backend failed, failing open");
                CopVerdict::clear()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysErrors;

    #[async_trait]
    impl Cop for AlwaysErrors {
        async fn classify(&self, _summary: &str) -> SecurityResult<CopVerdict> {
            Err(SecurityError::CopTransport("connection refused".to_string()))
        }
    }

    struct AlwaysSuspicious;

    #[async_trait]
    impl Cop for AlwaysSuspicious {
        async fn classify(&self, _summary: &str) -> SecurityResult<CopVerdict> {
            Ok(CopVerdict { suspicious: true })
        }
    }

    #[tokio::test]
    async fn fails_open_on_backend_error() {
        let cop = FailOpenCop::new(AlwaysErrors);
        let verdict = cop.classify("write to public_sink").await;
        assert!(!verdict.suspicious);
    }

    #[tokio::test]
    async fn passes_through_a_real_verdict() {
        let cop = FailOpenCop::new(AlwaysSuspicious);
        let verdict = cop.classify("write to public_sink").await;
        assert!(verdict.suspicious);
    }

    #[tokio::test]
    async fn null_cop_is_always_clear() {
        let cop = NullCop;
        assert!(!cop.classify("anything").await.unwrap().suspicious);
    }
}
