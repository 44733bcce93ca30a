//! Geographic points, coordinate parsing, and great-circle distance.
//!
//! Coordinates are decimal degrees. A [`GeoPoint`] can only be constructed
//! through [`GeoPoint::new`] or [`GeoPoint::parse`], both of which enforce
//! the longitude/latitude ranges, so any `GeoPoint` in the system is valid.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in meters, used by [`GeoPoint::distance_meters`].
///
/// The responder directory query in `beacon-db` uses the same constant so
/// in-process and in-database distances agree.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A (longitude, latitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoreError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::Validation(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::Validation(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Parse a point from raw request fields.
    ///
    /// Missing, blank, or non-numeric values fail with
    /// [`CoreError::Validation`].
    pub fn parse(latitude: Option<&str>, longitude: Option<&str>) -> Result<Self, CoreError> {
        let latitude = parse_coordinate("latitude", latitude)?;
        let longitude = parse_coordinate("longitude", longitude)?;
        Self::new(longitude, latitude)
    }

    /// Great-circle distance to `other` in meters (haversine formula).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }

    /// Google Maps link that opens at this point.
    pub fn map_link(&self) -> String {
        format!(
            "https://maps.google.com/?q={},{}",
            self.latitude, self.longitude
        )
    }
}

fn parse_coordinate(field: &str, raw: Option<&str>) -> Result<f64, CoreError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))?;

    raw.parse::<f64>()
        .map_err(|_| CoreError::Validation(format!("{field} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accepts_decimal_strings() {
        let point = GeoPoint::parse(Some("28.6"), Some(" 77.1 ")).unwrap();
        assert_eq!(point.latitude, 28.6);
        assert_eq!(point.longitude, 77.1);
    }

    #[test]
    fn parse_rejects_missing_latitude() {
        let err = GeoPoint::parse(None, Some("77.1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("latitude is required"));
    }

    #[test]
    fn parse_rejects_blank_longitude() {
        let err = GeoPoint::parse(Some("28.6"), Some("  ")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("longitude is required"));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = GeoPoint::parse(Some("north"), Some("77.1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("must be a number"));
    }

    #[test]
    fn parse_rejects_nan() {
        assert!(GeoPoint::parse(Some("NaN"), Some("77.1")).is_err());
    }

    #[test]
    fn new_enforces_ranges() {
        assert!(GeoPoint::new(180.0, 90.0).is_ok());
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::new(180.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.1).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(77.1, 28.6).unwrap();
        assert_eq!(p.distance_meters(&p), 0.0);
    }

    #[test]
    fn distance_of_one_hundredth_degree_latitude() {
        let a = GeoPoint::new(77.1, 28.6).unwrap();
        let b = GeoPoint::new(77.1, 28.61).unwrap();
        // 0.01 degree of arc on a 6371 km sphere.
        let expected = EARTH_RADIUS_METERS * 0.01_f64.to_radians();
        assert!((a.distance_meters(&b) - expected).abs() < 0.01);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(77.1, 28.6).unwrap();
        let b = GeoPoint::new(77.25, 28.55).unwrap();
        assert!((a.distance_meters(&b) - b.distance_meters(&a)).abs() < 1e-6);
    }

    #[test]
    fn map_link_is_lat_then_lng() {
        let p = GeoPoint::new(77.1, 28.6).unwrap();
        assert_eq!(p.map_link(), "https://maps.google.com/?q=28.6,77.1");
    }
}
