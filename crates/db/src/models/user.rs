//! User entity model and DTOs.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`ProfileResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub vehicle_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_verified: bool,
    pub mode: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Profile fields shown to the account holder. Missing optional fields are
/// rendered as empty strings.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_number: String,
    pub emergency_contact: String,
    pub mode: String,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            name: user.user_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            vehicle_number: user.vehicle_number.clone().unwrap_or_default(),
            emergency_contact: user.emergency_contact.clone().unwrap_or_default(),
            mode: user.mode.clone(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
}

/// DTO for updating a profile. All fields are optional; `None` leaves the
/// column untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "vehicleNumber")]
    pub vehicle_number: Option<String>,
    #[serde(alias = "emergencyContact")]
    pub emergency_contact: Option<String>,
}
