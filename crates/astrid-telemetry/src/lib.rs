//! Logging and request-context tracing for the Astrid host.
//!
//! Provides a configurable `tracing` subscriber setup ([`LogConfig`],
//! [`setup_logging`]) and a [`RequestContext`] for correlating log lines
//! across one logical operation — a worker turn, a gate evaluation, a
//! scheduler tick.
//!
//! # Example
//!
//! ```rust,no_run
//! use astrid_telemetry::{setup_logging, LogConfig, LogFormat, RequestContext};
//!
//! # fn main() -> Result<(), astrid_telemetry::TelemetryError> {
//! let config = LogConfig::new("info").with_format(LogFormat::Json);
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("security_gate").with_operation("evaluate");
//! let _guard = ctx.enter();
//! tracing::info!("evaluating action");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget};
