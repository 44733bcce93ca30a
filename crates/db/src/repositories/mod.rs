//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notification_repo;
pub mod responder_repo;
pub mod session_repo;
pub mod sos_log_repo;
pub mod user_repo;

pub use notification_repo::NotificationRepo;
pub use responder_repo::ResponderRepo;
pub use session_repo::SessionRepo;
pub use sos_log_repo::SosLogRepo;
pub use user_repo::UserRepo;
