//! Selects the `Cop` backend from configuration (§4.J), so the rest of the
//! host can hold one concrete type regardless of whether the Cop is
//! enabled.

use astrid_config::SecurityConfig;
use astrid_security::{Cop, CopVerdict, HttpCop, NullCop, SecurityResult};
use async_trait::async_trait;

/// Either a real HTTP-backed Cop or a null one that never flags anything,
/// chosen once at startup from `security.cop_enabled`. Fail-open behavior
/// on transport/parse errors lives in `astrid-security` itself (`gate.rs`),
/// so this type only needs to pick which backend is consulted at all.
pub enum ConfiguredCop {
    /// `security.cop_enabled = true`: classify via HTTP.
    Http(HttpCop),
    /// `security.cop_enabled = false`: every summary is clear.
    Null(NullCop),
}

impl ConfiguredCop {
    /// Build the configured backend.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        if config.cop_enabled {
            Self::Http(HttpCop::new(config.cop_endpoint.clone()))
        } else {
            Self::Null(NullCop)
        }
    }
}

#[async_trait]
impl Cop for ConfiguredCop {
    async fn classify(&self, summary: &str) -> SecurityResult<CopVerdict> {
        match self {
            Self::Http(cop) => cop.classify(summary).await,
            Self::Null(cop) => cop.classify(summary).await,
        }
    }
}
