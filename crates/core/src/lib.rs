//! Domain types and workflows for the Beacon emergency-assistance backend.
//!
//! This crate performs no I/O of its own. External collaborators (responder
//! directory, messaging channel, place lookup, SOS log) are reached through
//! the traits in [`sos`], implemented by the `beacon-db`, `beacon-delivery`
//! and `beacon-places` crates.

pub mod account;
pub mod error;
pub mod geo;
pub mod otp;
pub mod pending_signup;
pub mod sos;
pub mod types;
