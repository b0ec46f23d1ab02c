//! Commonly used types for convenient import.
//!
//! ```
//! use astrid_telemetry::prelude::*;
//! ```

pub use crate::{
    setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget, RequestContext, RequestGuard, TelemetryError,
    TelemetryResult,
};
