//! Nearby-search client for the points-of-interest content API
//!
//! Returns the raw nearby-search document for a coordinate/category pair,
//! serving it from the cache when present. The document is kept verbatim;
//! identifier extraction happens in the aggregator.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::Coordinates;
use crate::cache::CacheStore;
use crate::transport::Transport;

/// Base URL for the content API nearby search
const NEARBY_SEARCH_URL: &str =
    "https://api.content.tripadvisor.com/api/v1/location/nearby_search";

/// Client for the nearby-search endpoint
pub struct NearbyClient {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    api_key: String,
    base_url: String,
}

impl NearbyClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: CacheStore,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            api_key: api_key.into(),
            base_url: NEARBY_SEARCH_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Cache key for a nearby-search document
    pub fn cache_key(coords: &Coordinates, category: &str) -> String {
        format!("{}_{category}.json", coords.as_key())
    }

    /// Fetches the nearby-search document for `coords` and `category`
    ///
    /// Serves the cached document when one exists. On a miss in cache-only
    /// mode, and on any upstream failure, returns an empty `{"data": []}`
    /// document so the caller degrades to zero results. Only successful
    /// responses are written to the cache.
    pub async fn fetch_nearby(
        &self,
        coords: &Coordinates,
        category: &str,
        cache_only: bool,
    ) -> Value {
        let key = Self::cache_key(coords, category);

        if self.cache.exists(&key) {
            if let Some(document) = self.cache.read(&key) {
                info!("loading nearby search from cache: {key}");
                return document;
            }
        }

        if cache_only {
            info!("cache-only mode: no cached nearby search for {key}");
            return empty_document();
        }

        let lat_long = coords.as_key();
        info!("fetching nearby search for {lat_long} ({category})");

        let result = self
            .transport
            .get_json(
                &self.base_url,
                &[
                    ("latLong", lat_long.as_str()),
                    ("key", self.api_key.as_str()),
                    ("category", category),
                    ("language", "en"),
                ],
                &[],
            )
            .await;

        match result {
            Ok(response) if response.is_success() => {
                if let Err(err) = self.cache.write(&key, &response.body) {
                    warn!("could not cache nearby search {key}: {err}");
                }
                response.body
            }
            Ok(response) => {
                warn!(
                    "nearby search for {lat_long} ({category}) returned status {}",
                    response.status
                );
                empty_document()
            }
            Err(err) => {
                warn!("nearby search for {lat_long} ({category}) failed: {err}");
                empty_document()
            }
        }
    }
}

/// The document shape returned when no nearby data is available
fn empty_document() -> Value {
    json!({"data": []})
}
