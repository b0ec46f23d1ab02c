//! Composition root (§4 components K and the `Host` that wires every other
//! component together): deploy/lifecycle continuation and the `Host`
//! struct that owns construction, the inbound/outbound pipelines, and
//! shutdown.
//!
//! Every other crate in this workspace is a library of parts; this is
//! where they're assembled into something that can actually run.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod cop;
mod deploy;
mod error;
mod host;
mod output;

pub use cop::ConfiguredCop;
pub use deploy::{continuation_path, load_and_consume_continuation, write_continuation, DeployContinuation};
pub use error::{KernelError, KernelResult};
pub use host::Host;
pub use output::BusOutputSink;
