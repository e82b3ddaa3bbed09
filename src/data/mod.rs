//! Core data models for the city POI lookup
//!
//! This module contains the coordinate pair resolved by geocoding, the
//! flattened per-location output record, and the clients for the upstream
//! geocoding and content APIs.

pub mod geocode;
pub mod location;
pub mod nearby;

pub use geocode::GeocodeClient;
pub use location::LocationClient;
pub use nearby::NearbyClient;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair resolved from a city name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Fixed-precision `lat,lon` form used in cache keys and as the
    /// nearby-search `latLong` parameter.
    ///
    /// Four decimal places (~10m) keep the string identical across runs
    /// for the same resolved point; cache hits depend on that.
    pub fn as_key(&self) -> String {
        format!("{:.4},{:.4}", self.lat, self.lon)
    }
}

/// Flattened per-location output record
///
/// Assembled by the aggregator from the detail and photo documents; fields
/// missing upstream are left as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRecord {
    /// Display name of the location
    pub name: String,
    /// Single-line address
    pub address: String,
    /// Web page for the location on the content provider
    pub url: String,
    /// Category the location was found under (e.g. "restaurants")
    pub category: String,
    /// Thumbnail URL of the first photo, if any
    pub photo: String,
}
