//! Coordinates, great-circle distance, and the geographic decay score.

use serde::{Deserialize, Serialize};

use crate::constants::geo::{EARTH_RADIUS_MILES, NEUTRAL_SCORE};

/// WGS84 coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Validated constructor; out-of-range or non-finite values yield `None`.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Build from optional halves; both must be present and valid.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        Self::new(lat?, lon?)
    }

    /// Great-circle (haversine) distance in miles.
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lon - self.lon).to_radians();
        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_MILES * c
    }
}

/// Distance between two optional points; `None` when either side is unknown.
pub fn distance_between(a: Option<&GeoPoint>, b: Option<&GeoPoint>) -> Option<f64> {
    Some(a?.distance_miles(b?))
}

/// Latitude/longitude box used as a cheap candidate pre-filter.
///
/// Longitude bounds may extend past ±180°; `contains` wraps them across the
/// antimeridian.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBox {
    /// Southern bound.
    pub min_lat: f64,
    /// Northern bound.
    pub max_lat: f64,
    /// Western bound.
    pub min_lon: f64,
    /// Eastern bound.
    pub max_lon: f64,
}

impl GeoBox {
    /// Box extending `degrees` in every direction from `center`.
    pub fn around(center: &GeoPoint, degrees: f64) -> Self {
        Self {
            min_lat: center.lat - degrees,
            max_lat: center.lat + degrees,
            min_lon: center.lon - degrees,
            max_lon: center.lon + degrees,
        }
    }

    /// Whether `point` lies inside the box, bounds inclusive.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat) && self.contains_lon(point.lon)
    }

    fn contains_lon(&self, lon: f64) -> bool {
        let width = self.max_lon - self.min_lon;
        if width >= 360.0 {
            return true;
        }
        (lon - self.min_lon).rem_euclid(360.0) <= width
    }
}

/// Exponential proximity score `e^(-distance / decay_miles)`.
///
/// Unknown distance is neutral (0.5): missing coordinates are not evidence
/// against a match.
pub fn score_geo(distance_miles: Option<f64>, decay_miles: f64) -> f64 {
    match distance_miles {
        None => NEUTRAL_SCORE,
        Some(distance) => (-distance.max(0.0) / decay_miles).exp(),
    }
}
