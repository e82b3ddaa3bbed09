//! Location detail and photo clients for the content API
//!
//! Details and photos share one cached-fetch state machine and differ only
//! in endpoint, query parameters, and cache location. Documents are kept
//! verbatim; field extraction happens in the aggregator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::transport::Transport;

/// Base URL for the per-location content API endpoints
const LOCATION_BASE_URL: &str = "https://api.content.tripadvisor.com/api/v1/location";

/// Cache key for the category-agnostic details document
pub fn details_key(id: &str) -> String {
    format!("data/location_details/{id}/details.json")
}

/// Cache key for the details document as seen by one category request
pub fn details_key_for_category(id: &str, category: &str) -> String {
    format!("data/location_details/{id}/details_{category}.json")
}

/// Cache key for the category-agnostic photos document
pub fn photos_key(id: &str) -> String {
    format!("data/photos/{id}/photos.json")
}

/// Cache key for the photos document as seen by one category request
pub fn photos_key_for_category(id: &str, category: &str) -> String {
    format!("data/photos/{id}/photos_{category}.json")
}

/// The two per-location resource kinds served by the content API
#[derive(Debug, Clone, Copy)]
enum Resource {
    Details,
    Photos,
}

impl Resource {
    fn cache_key(self, id: &str) -> String {
        match self {
            Resource::Details => details_key(id),
            Resource::Photos => photos_key(id),
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Resource::Details => "details",
            Resource::Photos => "photos",
        }
    }
}

/// Client for per-location detail and photo documents
pub struct LocationClient {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    api_key: String,
    base_url: String,
}

impl LocationClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: CacheStore,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            api_key: api_key.into(),
            base_url: LOCATION_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches the descriptive fields document for a location
    pub async fn fetch_details(&self, id: &str, cache_only: bool) -> Option<Value> {
        self.fetch(Resource::Details, id, cache_only).await
    }

    /// Fetches the photo metadata document for a location
    pub async fn fetch_photos(&self, id: &str, cache_only: bool) -> Option<Value> {
        self.fetch(Resource::Photos, id, cache_only).await
    }

    /// Cached-fetch state machine shared by both resource kinds
    ///
    /// Cache hit wins; a miss in cache-only mode is `None`; a live fetch
    /// persists and returns the document on success, and on failure reports
    /// the status and returns `None` without caching anything.
    async fn fetch(&self, resource: Resource, id: &str, cache_only: bool) -> Option<Value> {
        let key = resource.cache_key(id);

        if self.cache.exists(&key) {
            if let Some(document) = self.cache.read(&key) {
                info!("loading location {} from cache: {key}", resource.endpoint());
                return Some(document);
            }
        }

        if cache_only {
            info!(
                "cache-only mode: no cached {} for location {id}",
                resource.endpoint()
            );
            return None;
        }

        let url = format!("{}/{id}/{}", self.base_url, resource.endpoint());
        info!("fetching {} for location {id}", resource.endpoint());

        let query: Vec<(&str, &str)> = match resource {
            Resource::Details => vec![
                ("key", self.api_key.as_str()),
                ("language", "en"),
                ("currency", "USD"),
            ],
            Resource::Photos => vec![
                ("key", self.api_key.as_str()),
                ("language", "en"),
                ("limit", "50"),
                ("offset", "1"),
            ],
        };

        match self.transport.get_json(&url, &query, &[]).await {
            Ok(response) if response.is_success() => {
                if let Err(err) = self.cache.write(&key, &response.body) {
                    warn!(
                        "could not cache {} for location {id}: {err}",
                        resource.endpoint()
                    );
                }
                Some(response.body)
            }
            Ok(response) => {
                warn!(
                    "{} request for location {id} returned status {}",
                    resource.endpoint(),
                    response.status
                );
                None
            }
            Err(err) => {
                warn!(
                    "{} request for location {id} failed: {err}",
                    resource.endpoint()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::{NoNetworkTransport, StubTransport};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_cache() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::with_root(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_cache_key_shapes() {
        assert_eq!(details_key("111"), "data/location_details/111/details.json");
        assert_eq!(
            details_key_for_category("111", "restaurants"),
            "data/location_details/111/details_restaurants.json"
        );
        assert_eq!(photos_key("111"), "data/photos/111/photos.json");
        assert_eq!(
            photos_key_for_category("111", "hotels"),
            "data/photos/111/photos_hotels.json"
        );
    }

    #[tokio::test]
    async fn test_details_live_fetch_caches_and_second_call_is_a_hit() {
        let (cache, _temp_dir) = test_cache();
        let transport = Arc::new(StubTransport::new().route(
            "/111/details",
            json!({"name": "Pike Place", "web_url": "http://x"}),
        ));
        let client = LocationClient::new(transport.clone(), cache.clone(), "test-key");

        let first = client.fetch_details("111", false).await.expect("should fetch");
        let second = client.fetch_details("111", false).await.expect("should fetch");

        assert_eq!(first, second);
        assert_eq!(transport.call_count(), 1, "second call must be a pure cache hit");
        assert!(cache.exists("data/location_details/111/details.json"));
    }

    #[tokio::test]
    async fn test_photos_live_fetch_caches_under_photos_key() {
        let (cache, _temp_dir) = test_cache();
        let transport = Arc::new(StubTransport::new().route(
            "/111/photos",
            json!({"data": [{"images": {"thumbnail": {"url": "http://img"}}}]}),
        ));
        let client = LocationClient::new(transport, cache.clone(), "test-key");

        let document = client.fetch_photos("111", false).await.expect("should fetch");

        assert_eq!(
            document["data"][0]["images"]["thumbnail"]["url"],
            json!("http://img")
        );
        assert!(cache.exists("data/photos/111/photos.json"));
    }

    #[tokio::test]
    async fn test_cache_only_miss_is_none_without_network() {
        let (cache, _temp_dir) = test_cache();
        let client = LocationClient::new(Arc::new(NoNetworkTransport), cache, "test-key");

        assert!(client.fetch_details("111", true).await.is_none());
        assert!(client.fetch_photos("111", true).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_only_hit_serves_cached_document() {
        let (cache, _temp_dir) = test_cache();
        let cached = json!({"name": "Gas Works Park"});
        cache
            .write(&details_key("222"), &cached)
            .expect("Write should succeed");

        let client = LocationClient::new(Arc::new(NoNetworkTransport), cache, "test-key");
        let document = client.fetch_details("222", true).await.expect("should hit cache");

        assert_eq!(document, cached);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_none_and_not_cached() {
        let (cache, _temp_dir) = test_cache();
        let transport = Arc::new(StubTransport::new().route_status(
            "/404404/details",
            404,
            json!({"message": "not found"}),
        ));
        let client = LocationClient::new(transport, cache.clone(), "test-key");

        assert!(client.fetch_details("404404", false).await.is_none());
        assert!(
            !cache.exists("data/location_details/404404/details.json"),
            "failed responses must not be cached"
        );
    }

    #[tokio::test]
    async fn test_details_and_photos_cache_independently() {
        let (cache, _temp_dir) = test_cache();
        let transport = Arc::new(
            StubTransport::new()
                .route("/555/details", json!({"name": "Space Needle"}))
                .route("/555/photos", json!({"data": []})),
        );
        let client = LocationClient::new(transport.clone(), cache.clone(), "test-key");

        client.fetch_details("555", false).await.expect("details");
        client.fetch_photos("555", false).await.expect("photos");
        client.fetch_details("555", false).await.expect("details again");

        assert_eq!(transport.calls_matching("details"), 1);
        assert_eq!(transport.calls_matching("photos"), 1);
        assert!(cache.exists("data/location_details/555/details.json"));
        assert!(cache.exists("data/photos/555/photos.json"));
    }
}
