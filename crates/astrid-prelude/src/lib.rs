//! Single-import convenience re-export of the host's public surface.
//!
//! ```
//! use astrid_prelude::*;
//! ```
//!
//! Intended for `astrid-cli` and integration tests that otherwise need a
//! dozen `use` lines to touch every layer of the host. Library crates
//! should keep depending on the specific crate they need rather than this
//! one, to keep their own dependency graphs honest.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]
#![allow(unused_imports)]

pub use astrid_core::{
    AuditEvent, Channel, ChannelError, ChannelResult, ChannelCursor, ContextMode, CoreError, CoreResult, Decision, Direction,
    HostJob, InvocationTs, Message, MessageId, Question, RequestId, ScheduleKind, ScheduledTask, ServiceTrustConfig,
    Session, SessionToken, Taints, TaskStatus, Timestamp, TrustBit, Workspace, WorkspaceFolder, WorkspaceId, WorkspaceSecurity,
};

pub use astrid_config::{
    load as load_config, load_file as load_config_file, CommandsConfig, ConfigError, ConfigResult, HostConfig, SchedulerConfig,
    SecurityConfig, TelemetryConfig, WorkerConfig, WorkspaceDefaults,
};

pub use astrid_telemetry::{
    setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult,
};

pub use astrid_fs::{FsError, FsResult};

pub use astrid_ipc::{IpcError, IpcFabric, IpcResult, InputEvent, OutputEvent, TaskKind, TaskRequest};

pub use astrid_storage::{
    CursorStore, MessageStore, ScheduleStore, SessionStore, Store, StorageError, StorageResult, WorkspaceStore,
};

pub use astrid_audit::{AuditError, AuditLog, AuditResult};

pub use astrid_security::{
    ActionKind, BashClass, BashVerdict, Cop, CopVerdict, EvalOutcome, EvalRequest, FailOpenCop, GateKey, HttpCop, NullCop,
    SecurityError, SecurityGate, SecurityResult,
};

pub use astrid_approval::{
    cold_path_context, ApprovalDecision, ApprovalError, ApprovalManager, ApprovalResult, AwaitOutcome, HandlerType,
    PendingApproval, PendingQuestion, QuestionManager,
};

pub use astrid_workspace::{slugify, validate_folder, WorkspaceError, WorkspaceLayout, WorkspaceResult};

pub use astrid_events::{
    detect_magic_command, detect_reaction, strip_trigger, AliasTable, CommandWords, EventsError, EventsResult,
    InboundOutcome, InboundRouter, MagicCommand, MessageBus, ReactionKind,
};

pub use astrid_runtime::{
    CommandSpawner, NullOutputSink, OutputSink, RuntimeError, RuntimeResult, SessionManager, TaskOutcome, TaskRouter,
    WorkerHandle, WorkerSpawner, WorkspaceQueue,
};

pub use astrid_scheduler::{next_run_after, now as scheduler_now, resolve_timezone, validate_schedule, Scheduler, SchedulerError, SchedulerResult};

pub use astrid_kernel::{
    continuation_path, load_and_consume_continuation, write_continuation, BusOutputSink, ConfiguredCop, DeployContinuation,
    Host, KernelError, KernelResult,
};
