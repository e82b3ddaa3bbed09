//! Nominatim geocoding client
//!
//! Resolves a city name (optionally qualified by a region) to coordinates
//! using OpenStreetMap's Nominatim search service. Lookups are not cached;
//! the resolved pair only feeds the nearby-search cache key.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::Coordinates;
use crate::transport::{Transport, TransportError};

/// Base URL for the Nominatim search API
const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// User-Agent identifying this application; Nominatim rejects anonymous clients
const USER_AGENT: &str = "citypoi/0.1 (city points-of-interest lookup)";

/// Errors that can occur while geocoding an address
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] TransportError),

    /// Geocoding service returned a non-success status
    #[error("geocoding service returned status {0}")]
    Status(u16),

    /// Response was not the expected array of matches
    #[error("unexpected geocoding response shape: {0}")]
    Malformed(#[from] serde_json::Error),

    /// No match for the requested address
    #[error("no match for '{0}'")]
    NoMatch(String),

    /// A match was returned but its coordinates were unparsable
    #[error("unparsable coordinates in match: {0}")]
    BadCoordinates(String),
}

/// One match in a Nominatim response; lat/lon arrive as strings
#[derive(Debug, Deserialize)]
struct GeocodeMatch {
    lat: String,
    lon: String,
}

/// Client for resolving city names to coordinates
pub struct GeocodeClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl GeocodeClient {
    /// Creates a client against the public Nominatim endpoint
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: NOMINATIM_BASE_URL.to_string(),
        }
    }

    /// Overrides the service base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolves `city` (optionally qualified by `region`) to coordinates
    ///
    /// Any failure along the way (transport, non-success status, zero
    /// matches, unparsable coordinates) is reported and collapsed to
    /// `None`; geocoding trouble should shrink the result set, not surface
    /// as an error.
    pub async fn resolve(&self, city: &str, region: Option<&str>) -> Option<Coordinates> {
        let address = match region {
            Some(region) => format!("{city}, {region}"),
            None => city.to_string(),
        };

        match self.lookup(&address).await {
            Ok(coords) => Some(coords),
            Err(err) => {
                warn!("could not geocode '{address}': {err}");
                None
            }
        }
    }

    async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let response = self
            .transport
            .get_json(
                &self.base_url,
                &[("q", address), ("format", "json"), ("limit", "1")],
                &[("User-Agent", USER_AGENT)],
            )
            .await?;

        if !response.is_success() {
            return Err(GeocodeError::Status(response.status));
        }

        let matches: Vec<GeocodeMatch> = serde_json::from_value(response.body)?;
        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))?;

        match (first.lat.parse::<f64>(), first.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(GeocodeError::BadCoordinates(format!(
                "{},{}",
                first.lat, first.lon
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::StubTransport;
    use serde_json::json;

    fn client_with(transport: StubTransport) -> (GeocodeClient, Arc<StubTransport>) {
        let transport = Arc::new(transport);
        let client = GeocodeClient::new(transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn test_resolve_returns_first_match() {
        let (client, _transport) = client_with(StubTransport::new().route(
            "nominatim",
            json!([
                {"lat": "47.6", "lon": "-122.3", "display_name": "Seattle"},
                {"lat": "0.0", "lon": "0.0", "display_name": "elsewhere"}
            ]),
        ));

        let coords = client.resolve("Seattle", Some("WA")).await.expect("should resolve");
        assert_eq!(coords, Coordinates::new(47.6, -122.3));
    }

    #[tokio::test]
    async fn test_resolve_is_deterministic() {
        let (client, _transport) = client_with(
            StubTransport::new()
                .route("nominatim", json!([{"lat": "47.6", "lon": "-122.3"}])),
        );

        let first = client.resolve("Seattle", Some("WA")).await.expect("should resolve");
        let second = client.resolve("Seattle", Some("WA")).await.expect("should resolve");
        assert_eq!(first.as_key(), second.as_key());
        assert_eq!(first.as_key(), "47.6000,-122.3000");
    }

    #[tokio::test]
    async fn test_resolve_without_region() {
        let (client, transport) = client_with(
            StubTransport::new()
                .route("nominatim", json!([{"lat": "48.4284", "lon": "-123.3656"}])),
        );

        let coords = client.resolve("Victoria", None).await.expect("should resolve");
        assert_eq!(coords, Coordinates::new(48.4284, -123.3656));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_empty_result_is_none() {
        let (client, _transport) =
            client_with(StubTransport::new().route("nominatim", json!([])));

        assert!(client.resolve("Nowhereville", Some("ZZ")).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_error_status_is_none() {
        let (client, _transport) = client_with(
            StubTransport::new().route_status("nominatim", 503, json!({"error": "down"})),
        );

        assert!(client.resolve("Seattle", Some("WA")).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_unparsable_coordinates_is_none() {
        let (client, _transport) = client_with(
            StubTransport::new()
                .route("nominatim", json!([{"lat": "north-ish", "lon": "-122.3"}])),
        );

        assert!(client.resolve("Seattle", Some("WA")).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_malformed_body_is_none() {
        let (client, _transport) = client_with(
            StubTransport::new().route("nominatim", json!({"unexpected": "object"})),
        );

        assert!(client.resolve("Seattle", Some("WA")).await.is_none());
    }
}
