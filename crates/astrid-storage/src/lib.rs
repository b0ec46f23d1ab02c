//! Durable state store: workspaces, messages, cursors, sessions, scheduled
//! work. Backed by an embedded `SurrealDB`, with every write serialized
//! behind a single process-wide transaction lock (§4.C).
//!
//! `PendingApproval`, `PendingQuestion`, and `AuditEvent` are file-backed
//! rather than stored here — see `astrid-approval` and `astrid-audit`.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod cursors;
mod db;
mod error;
mod messages;
mod schedule;
mod sessions;
mod store;
mod workspaces;

pub use cursors::CursorStore;
pub use db::Db;
pub use error::{StorageError, StorageResult};
pub use messages::MessageStore;
pub use schedule::ScheduleStore;
pub use sessions::SessionStore;
pub use store::Store;
pub use workspaces::WorkspaceStore;
