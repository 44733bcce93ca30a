//! SOS audit log rows. Insert-only.

use beacon_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sos_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SosLogRow {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub longitude: f64,
    pub latitude: f64,
    pub media_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a log entry.
pub struct CreateSosLog {
    pub user_id: Option<DbId>,
    pub longitude: f64,
    pub latitude: f64,
    pub media_url: Option<String>,
}
