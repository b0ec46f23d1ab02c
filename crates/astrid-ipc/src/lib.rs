//! Host-side IPC fabric between the host and a worker process (§4.B).
//!
//! The directory layout, atomic write-temp-then-rename discipline, and
//! ordered filenames all come from `astrid-fs`; this crate adds the
//! fabric's JSON shapes (input/output events, task requests), the
//! directory-to-path mapping under a workspace's `ipc/` root, and the
//! watchers that turn newly-appeared files into typed values. The worker
//! process itself — what drains `input/`, what it does with a task's
//! reply, what it writes to `output/` — is opaque and out of scope here.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod event;
mod fabric;
mod task;
mod watch;

pub use error::{IpcError, IpcResult};
pub use event::{InputEvent, OutputEvent};
pub use fabric::IpcFabric;
pub use task::{classify_task_type, TaskKind, TaskRequest};
pub use watch::{OutputWatcher, TaskWatcher};
