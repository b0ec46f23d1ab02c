//! Worker session manager and per-workspace execution queue (§4's
//! components E and F).
//!
//! A worker process is opaque beyond the IPC contract `astrid-ipc`
//! describes: this crate owns spawning it, feeding it serialized input,
//! watching its output and `tasks/` requests, and tearing it down, either
//! on command or after it sits idle past its configured timeout.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod output;
mod process;
mod queue;
mod session;
mod spawner;
mod tasks;

pub use error::{RuntimeError, RuntimeResult};
pub use output::{NullOutputSink, OutputSink};
pub use process::WorkerHandle;
pub use queue::WorkspaceQueue;
pub use session::SessionManager;
pub use spawner::{CommandSpawner, WorkerSpawner};
pub use tasks::{TaskOutcome, TaskRouter};
