//! Repository for the `responders` table.

use beacon_core::geo::EARTH_RADIUS_METERS;
use sqlx::PgPool;

use crate::models::responder::{CreateResponder, NearbyResponder, ResponderRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, phone, longitude, latitude, created_at, updated_at";

/// Provides CRUD and proximity queries for responders.
pub struct ResponderRepo;

impl ResponderRepo {
    /// Insert a new responder, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateResponder,
    ) -> Result<ResponderRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO responders (name, phone, longitude, latitude)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResponderRow>(&query)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_one(pool)
            .await
    }

    /// Responders within `radius_m` meters of (`longitude`, `latitude`),
    /// nearest first, at most `limit` rows.
    ///
    /// Distance is the haversine great-circle distance on a sphere of
    /// [`EARTH_RADIUS_METERS`], matching `GeoPoint::distance_meters`.
    pub async fn nearest(
        pool: &PgPool,
        longitude: f64,
        latitude: f64,
        radius_m: f64,
        limit: i64,
    ) -> Result<Vec<NearbyResponder>, sqlx::Error> {
        sqlx::query_as::<_, NearbyResponder>(
            "SELECT id, name, phone, longitude, latitude, distance_m FROM (
                SELECT id, name, phone, longitude, latitude,
                       2 * $3 * ASIN(LEAST(1.0, SQRT(
                           POWER(SIN(RADIANS(latitude - $2) / 2), 2)
                           + COS(RADIANS($2)) * COS(RADIANS(latitude))
                             * POWER(SIN(RADIANS(longitude - $1) / 2), 2)
                       ))) AS distance_m
                FROM responders
             ) r
             WHERE distance_m <= $4
             ORDER BY distance_m ASC, id ASC
             LIMIT $5",
        )
        .bind(longitude)
        .bind(latitude)
        .bind(EARTH_RADIUS_METERS)
        .bind(radius_m)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
