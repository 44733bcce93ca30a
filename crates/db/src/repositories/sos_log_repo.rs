//! Repository for the append-only `sos_logs` table.
//!
//! Only insert and read operations exist; the table rejects UPDATE and
//! DELETE at the database level.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::sos_log::{CreateSosLog, SosLogRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, longitude, latitude, media_url, created_at";

pub struct SosLogRepo;

impl SosLogRepo {
    /// Append a log entry, returning the stored row with its generated id
    /// and timestamp.
    pub async fn create(pool: &PgPool, input: &CreateSosLog) -> Result<SosLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sos_logs (user_id, longitude, latitude, media_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SosLogRow>(&query)
            .bind(input.user_id)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(&input.media_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SosLogRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sos_logs WHERE id = $1");
        sqlx::query_as::<_, SosLogRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's entries, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<SosLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sos_logs WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SosLogRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sos_logs")
            .fetch_one(pool)
            .await
    }
}
