use std::sync::Arc;

use beacon_core::pending_signup::PendingSignups;
use beacon_core::sos::{NotificationDispatcher, SosWorkflow};
use beacon_delivery::OtpMailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: beacon_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SOS dispatch workflow with its collaborators wired in.
    pub sos: Arc<SosWorkflow>,
    /// Messaging channel, also used directly by the test-alert endpoint.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// OTP mailer; `None` when SMTP is not configured.
    pub mailer: Option<Arc<OtpMailer>>,
    /// Signups awaiting OTP verification.
    pub pending_signups: Arc<PendingSignups>,
}
