//! Row models and DTOs, one submodule per table.

pub mod notification;
pub mod responder;
pub mod session;
pub mod sos_log;
pub mod user;
