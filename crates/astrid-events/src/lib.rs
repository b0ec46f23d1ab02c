//! Message router and outbound fan-out bus (§4.G).
//!
//! Inbound messages flow through [`InboundRouter`]: canonical chat id
//! resolution, idempotent storage, and magic-command detection. Outbound
//! worker output and host notices flow through [`MessageBus`], the single
//! code path for fan-out to every channel that owns a canonical chat id.
//! Concrete channel adapters are out of scope here — this crate only
//! consumes [`astrid_core::Channel`] trait objects.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod alias;
mod bus;
mod error;
mod magic;
mod reaction;
mod router;
mod trigger;

pub use alias::AliasTable;
pub use bus::{MessageBus, SEND_RETRY_ATTEMPTS};
pub use error::{EventsError, EventsResult};
pub use magic::{detect as detect_magic_command, CommandWords, MagicCommand};
pub use reaction::{detect as detect_reaction, ReactionKind};
pub use router::{InboundOutcome, InboundRouter};
pub use trigger::strip as strip_trigger;
