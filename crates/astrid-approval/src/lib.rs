//! Approval and pending-question state machines (§4's component I).
//!
//! When the security gate returns `needs_human`, the host creates a
//! file-backed [`PendingApproval`] and waits on a decision file the user's
//! `approve`/`deny` command writes. Short ids let a human resolve a request
//! without typing a full UUID. The `ask_user` flow is a parallel but
//! simpler state machine: a [`PendingQuestion`] is answered either on the
//! warm path (worker still alive, IPC response) or the cold path (worker
//! exited, answer re-delivered as a normal message).

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod manager;
mod question;
mod types;

pub use error::{ApprovalError, ApprovalResult};
pub use manager::{ApprovalManager, AwaitOutcome};
pub use question::{cold_path_context, QuestionManager};
pub use types::{ApprovalDecision, HandlerType, PendingApproval, PendingQuestion};
