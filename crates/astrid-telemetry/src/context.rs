//! Request-scoped tracing context for correlating log lines across an
//! operation (a worker turn, a scheduler tick, a gate evaluation).

use std::time::Instant;

use tracing::span::EnteredSpan;
use tracing::{info_span, Span};
use uuid::Uuid;

/// Identifies one logical operation for the duration it runs, so every
/// `tracing` event emitted underneath it carries the same `request_id`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    component: String,
    operation: Option<String>,
}

impl RequestContext {
    /// Start a new context for `component` (e.g. `"worker_session"`,
    /// `"security_gate"`).
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            component: component.into(),
            operation: None,
        }
    }

    /// Name the specific operation within `component` this context covers.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// The correlation id every event under this context's span will carry.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Build the `tracing` span for this context. Caller enters it (or
    /// calls [`Self::enter`] for a guard that also logs elapsed time).
    #[must_use]
    pub fn span(&self) -> Span {
        info_span!(
            "request",
            request_id = %self.request_id,
            component = %self.component,
            operation = self.operation.as_deref().unwrap_or("-"),
        )
    }

    /// Enter this context's span and start timing it. Dropping the
    /// returned guard exits the span and logs how long it was held.
    #[must_use]
    pub fn enter(&self) -> RequestGuard {
        RequestGuard {
            component: self.component.clone(),
            request_id: self.request_id,
            started: Instant::now(),
            _entered: self.span().entered(),
        }
    }
}

/// Keeps a [`RequestContext`]'s span entered and logs its duration on drop.
pub struct RequestGuard {
    component: String,
    request_id: Uuid,
    started: Instant,
    _entered: EnteredSpan,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis();
        tracing::debug!(
            request_id = %self.request_id,
            component = %self.component,
            elapsed_ms,
            "request complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_operation_is_visible_on_the_built_span() {
        let ctx = RequestContext::new("security_gate").with_operation("evaluate");
        let span = ctx.span();
        assert_eq!(span.metadata().map(tracing::Metadata::name), Some("request"));
    }

    #[test]
    fn enter_produces_a_guard_without_panicking() {
        let ctx = RequestContext::new("scheduler");
        let _guard = ctx.enter();
    }
}
