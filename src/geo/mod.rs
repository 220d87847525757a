//! Geographic primitives
//!
//! Coordinates and great-circle distance.

use crate::constants::geo::{EARTH_RADIUS_KM, KEY_PRECISION};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A geographic coordinate (latitude, longitude) in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build coordinates from optional parts, keeping them only if usable
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)).filter(Self::is_usable),
            _ => None,
        }
    }

    /// Whether this point can be used for a route lookup
    ///
    /// A zero component is treated as "not set", matching how callers pass
    /// coordinates they have not filled in yet.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat != 0.0 && self.lng != 0.0
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// "lat,lng" rounded to the key precision
    fn key_part(&self) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            self.lat,
            self.lng,
            prec = KEY_PRECISION
        )
    }
}

/// Cache and dedup key for a route: "olat,olng-dlat,dlng" at 4 decimals
pub fn route_key(origin: Coordinates, destination: Coordinates) -> String {
    format!("{}-{}", origin.key_part(), destination.key_part())
}

/// Great-circle distance between two points in kilometers (Haversine formula)
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat * PI / 180.0;
    let lat2 = b.lat * PI / 180.0;
    let delta_lat = (b.lat - a.lat) * PI / 180.0;
    let delta_lng = (b.lng - a.lng) * PI / 180.0;

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
