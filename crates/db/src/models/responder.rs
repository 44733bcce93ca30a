//! Responder directory rows.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `responders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResponderRow {
    pub id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A responder returned by a proximity query, with its distance from the
/// query point.
#[derive(Debug, Clone, FromRow)]
pub struct NearbyResponder {
    pub id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_m: f64,
}

/// DTO for registering a responder.
#[derive(Debug, Deserialize)]
pub struct CreateResponder {
    pub name: String,
    pub phone: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
}
