//! PostgreSQL implementations of the SOS collaborator traits.

use async_trait::async_trait;
use beacon_core::error::CoreError;
use beacon_core::geo::GeoPoint;
use beacon_core::sos::{NewSosEvent, Responder, ResponderDirectory, SosEvent, SosLogStore};

use crate::models::sos_log::{CreateSosLog, SosLogRow};
use crate::repositories::{ResponderRepo, SosLogRepo};
use crate::DbPool;

/// Storage failures surface as dependency errors: the workflow treats the
/// database like any other collaborator it cannot proceed without.
fn dependency(context: &str, err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "{context}");
    CoreError::Dependency(format!("{context}: {err}"))
}

/// Responder directory backed by the `responders` table.
#[derive(Clone)]
pub struct PgResponderDirectory {
    pool: DbPool,
}

impl PgResponderDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponderDirectory for PgResponderDirectory {
    async fn nearest(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        limit: usize,
    ) -> Result<Vec<Responder>, CoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = ResponderRepo::nearest(
            &self.pool,
            point.longitude,
            point.latitude,
            radius_meters,
            limit,
        )
        .await
        .map_err(|e| dependency("responder directory query failed", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(Responder {
                    id: row.id.to_string(),
                    name: row.name,
                    phone: row.phone,
                    point: GeoPoint::new(row.longitude, row.latitude)?,
                })
            })
            .collect()
    }
}

/// SOS log backed by the append-only `sos_logs` table.
#[derive(Clone)]
pub struct PgSosLogStore {
    pool: DbPool,
}

impl PgSosLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SosLogStore for PgSosLogStore {
    async fn append(&self, event: NewSosEvent) -> Result<SosEvent, CoreError> {
        let input = CreateSosLog {
            user_id: event.user_id,
            longitude: event.point.longitude,
            latitude: event.point.latitude,
            media_url: event.media_url,
        };
        let row = SosLogRepo::create(&self.pool, &input)
            .await
            .map_err(|e| dependency("failed to append SOS log", e))?;
        row.try_into()
    }
}

impl TryFrom<SosLogRow> for SosEvent {
    type Error = CoreError;

    fn try_from(row: SosLogRow) -> Result<Self, Self::Error> {
        Ok(SosEvent {
            id: row.id,
            user_id: row.user_id,
            point: GeoPoint::new(row.longitude, row.latitude)?,
            media_url: row.media_url,
            created_at: row.created_at,
        })
    }
}
