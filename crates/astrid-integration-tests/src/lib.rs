#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Integration test crate for the Astrid host.
//!
//! This crate exists solely for end-to-end testing of [`astrid_kernel::Host`]
//! across its sibling crates. It is `publish = false` and has no library
//! code of its own — all tests live under `tests/`.
