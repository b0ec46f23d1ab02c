//! Cron/interval scheduler for agent tasks and host jobs (§4's component
//! H): a single ticker that polls the schedule store, enqueues due agent
//! prompts onto the worker session manager, and runs due host jobs as
//! shell commands.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod clock;
mod error;
mod ticker;

pub use clock::{next_run_after, now, resolve_timezone, validate as validate_schedule};
pub use error::{SchedulerError, SchedulerResult};
pub use ticker::Scheduler;
