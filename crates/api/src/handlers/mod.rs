pub mod account;
pub mod auth;
pub mod notification;
pub mod sos;
