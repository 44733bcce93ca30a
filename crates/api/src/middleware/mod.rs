//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid JWT Bearer token.
//! - [`auth::OptionalAuthUser`] -- accepts anonymous requests but validates a
//!   token when one is sent.

pub mod auth;
