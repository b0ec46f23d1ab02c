#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

//! Astrid Core — shared domain types for the Astrid agent orchestration host.
//!
//! This crate holds the entities described in the host's data model
//! (workspaces, messages, sessions, scheduled work) and the `Channel`
//! capability trait that every concrete chat adapter implements. It has no
//! dependency on any particular storage backend, IPC transport, or security
//! policy — those live in their own crates and depend on this one.

pub mod audit;
pub mod channel;
pub mod cursor;
pub mod error;
pub mod ids;
pub mod message;
pub mod prelude;
pub mod schedule;
pub mod security;
pub mod session;
pub mod timestamp;
pub mod workspace;

pub use audit::AuditEvent;
pub use channel::{Channel, ChannelError, ChannelResult, Question};
pub use cursor::ChannelCursor;
pub use error::{CoreError, CoreResult};
pub use ids::{InvocationTs, MessageId, RequestId, SessionToken, WorkspaceFolder, WorkspaceId};
pub use message::{Direction, Message};
pub use schedule::{ContextMode, HostJob, ScheduleKind, ScheduledTask, TaskStatus};
pub use security::{Decision, Taints};
pub use session::Session;
pub use timestamp::Timestamp;
pub use workspace::{ServiceTrustConfig, TrustBit, Workspace, WorkspaceSecurity};
