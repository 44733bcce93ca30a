//! In-app notification model and DTOs.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub seen: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub message: String,
}
