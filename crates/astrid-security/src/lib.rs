//! Security gate (§4's component D): taint propagation, the deterministic
//! secrets scanner, the Cop (secondary LLM scrutiny), and bash gating.
//!
//! The gate is evaluated once per action a worker takes against a
//! service, and is instantiated fresh per invocation so taint state never
//! crosses invocation boundaries.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod bash;
mod cop;
mod error;
mod gate;
mod scanner;
mod taint;

pub use bash::{classify as classify_bash, evaluate_escalation as evaluate_bash_escalation, BashClass, BashVerdict};
pub use cop::{Cop, CopVerdict, FailOpenCop, HttpCop, NullCop};
pub use error::{SecurityError, SecurityResult};
pub use gate::{ActionKind, EvalOutcome, EvalRequest, SecurityGate};
pub use scanner::{contains_secret, scan, ScanHit};
pub use taint::{GateKey, TaintRegistry};
