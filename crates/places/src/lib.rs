//! Client for the Google Places "nearby search" endpoint.
//!
//! [`GooglePlacesClient`] implements [`PlaceLookup`] for the SOS workflow:
//! one `GET /maps/api/place/nearbysearch/json` per category, keyed by API
//! key, point, radius and place type.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::error::CoreError;
use beacon_core::geo::GeoPoint;
use beacon_core::sos::{Place, PlaceCategory, PlaceLookup};
use serde::Deserialize;

/// Production Places API host.
pub const DEFAULT_PLACES_API_URL: &str = "https://maps.googleapis.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the Places API layer.
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Places API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The API answered 200 with a non-OK `status` field
    /// (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...).
    #[error("Places API returned {status}: {message}")]
    Rejected { status: String, message: String },
}

/// The request URL carries the API key as a query parameter, so it is
/// stripped before the error can reach a log line.
impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        PlacesError::Request(err.without_url())
    }
}

impl From<PlacesError> for CoreError {
    fn from(err: PlacesError) -> Self {
        CoreError::Dependency(format!("place lookup failed: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl PlacesConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `GOOGLE_MAPS_API_KEY` is not set.
    ///
    /// | Variable              | Required | Default                       |
    /// |-----------------------|----------|-------------------------------|
    /// | `GOOGLE_MAPS_API_KEY` | yes      |                               |
    /// | `PLACES_API_URL`      | no       | `https://maps.googleapis.com` |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self {
            api_key,
            api_url: std::env::var("PLACES_API_URL")
                .unwrap_or_else(|_| DEFAULT_PLACES_API_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Convert a decoded response into places, dropping results whose
/// coordinates are out of range.
fn into_places(response: NearbySearchResponse) -> Result<Vec<Place>, PlacesError> {
    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => {
            return Err(PlacesError::Rejected {
                message: response.error_message.unwrap_or_default(),
                status: response.status,
            })
        }
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(|r| {
            let point = GeoPoint::new(r.geometry.location.lng, r.geometry.location.lat).ok()?;
            Some(Place {
                id: r.place_id,
                name: r.name,
                address: r.vicinity,
                point,
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the nearby search endpoint.
pub struct GooglePlacesClient {
    client: reqwest::Client,
    config: PlacesConfig,
}

impl GooglePlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Places of `category` within `radius_meters` of `point`, in the order
    /// the API returns them.
    pub async fn nearby_search(
        &self,
        point: GeoPoint,
        category: PlaceCategory,
        radius_meters: f64,
    ) -> Result<Vec<Place>, PlacesError> {
        let location = format!("{},{}", point.latitude, point.longitude);
        let radius = format!("{}", radius_meters.round() as u64);

        let response = self
            .client
            .get(format!(
                "{}/maps/api/place/nearbysearch/json",
                self.config.api_url.trim_end_matches('/')
            ))
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", category.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlacesError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        into_places(response.json::<NearbySearchResponse>().await?)
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn nearby_by_category(
        &self,
        point: GeoPoint,
        category: PlaceCategory,
        radius_meters: f64,
    ) -> Result<Vec<Place>, CoreError> {
        let places = self
            .nearby_search(point, category, radius_meters)
            .await
            .inspect_err(|e| {
                tracing::warn!(category = category.as_str(), error = %e, "Place lookup failed")
            })?;
        tracing::debug!(category = category.as_str(), count = places.len(), "Place lookup");
        Ok(places)
    }
}

/// Lookup used when no API key is configured. Every call fails with
/// [`CoreError::Dependency`].
pub struct UnconfiguredPlaceLookup;

#[async_trait]
impl PlaceLookup for UnconfiguredPlaceLookup {
    async fn nearby_by_category(
        &self,
        _point: GeoPoint,
        _category: PlaceCategory,
        _radius_meters: f64,
    ) -> Result<Vec<Place>, CoreError> {
        Err(CoreError::Dependency(
            "place lookup is not configured (GOOGLE_MAPS_API_KEY unset)".into(),
        ))
    }
}
