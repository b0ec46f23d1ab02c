//! Commonly used types for convenient import.
//!
//! ```
//! use astrid_core::prelude::*;
//! ```

pub use crate::audit::AuditEvent;
pub use crate::channel::{Channel, ChannelError, ChannelResult, Question};
pub use crate::cursor::ChannelCursor;
pub use crate::error::{CoreError, CoreResult};
pub use crate::ids::{InvocationTs, MessageId, RequestId, SessionToken, WorkspaceFolder, WorkspaceId};
pub use crate::message::{Direction, Message};
pub use crate::schedule::{ContextMode, HostJob, ScheduleKind, ScheduledTask, TaskStatus};
pub use crate::security::{Decision, Taints};
pub use crate::session::Session;
pub use crate::timestamp::Timestamp;
pub use crate::workspace::{ServiceTrustConfig, TrustBit, Workspace, WorkspaceSecurity};
