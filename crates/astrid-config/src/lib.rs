#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

//! Layered configuration loading for the Astrid host.
//!
//! A single [`HostConfig`] consolidates every ambient setting: the data
//! root, workspace defaults, worker lifecycle tuning, scheduler cadence,
//! security gate timeouts, the magic-command surface, and telemetry.
//!
//! This crate has no dependency on any other internal `astrid-*` crate —
//! conversion from config types to domain types happens at the integration
//! boundary (`astrid-kernel`, `astrid-cli`).
//!
//! # Precedence
//!
//! From lowest to highest priority: embedded defaults, an optional
//! override file, `ASTRID_*` environment variables.

mod env;
mod error;
mod loader;
mod merge;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_file};
pub use types::{CommandsConfig, HostConfig, SchedulerConfig, SecurityConfig, TelemetryConfig, WorkerConfig, WorkspaceDefaults};
