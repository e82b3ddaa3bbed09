//! End-to-end assembly of per-location records for one category request
//!
//! Drives geocoding, the nearby search, and the per-location detail and
//! photo fetches, then flattens the raw documents into `LocationRecord`s.
//! Locations are processed strictly sequentially in nearby-search order,
//! and a failure for one location never aborts the rest.

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::data::location::{details_key_for_category, photos_key_for_category};
use crate::data::{GeocodeClient, LocationClient, LocationRecord, NearbyClient};

/// Orchestrates the geocode -> nearby -> details/photos pipeline
pub struct Aggregator {
    geocoder: GeocodeClient,
    nearby: NearbyClient,
    locations: LocationClient,
    cache: CacheStore,
}

impl Aggregator {
    pub fn new(
        geocoder: GeocodeClient,
        nearby: NearbyClient,
        locations: LocationClient,
        cache: CacheStore,
    ) -> Self {
        Self {
            geocoder,
            nearby,
            locations,
            cache,
        }
    }

    /// Fetches and flattens every nearby location for one
    /// (city, region, category) request.
    ///
    /// # Arguments
    /// * `city` - The name of the city
    /// * `region` - Optional region qualifier (e.g. a state abbreviation)
    /// * `category` - The category to fetch (e.g. "restaurants")
    /// * `cache_only` - If true, only use cached data; never call the APIs
    ///
    /// # Returns
    /// Flattened records in nearby-search order.
    ///
    /// # Behavior
    /// Failures shrink or empty the result instead of surfacing as errors:
    /// an unresolvable city or an empty nearby search yields `[]`, and a
    /// per-location fetch failure yields an empty-defaulted record in that
    /// location's slot.
    pub async fn fetch_category_data(
        &self,
        city: &str,
        region: Option<&str>,
        category: &str,
        cache_only: bool,
    ) -> Vec<LocationRecord> {
        let Some(coords) = self.geocoder.resolve(city, region).await else {
            warn!("could not find coordinates for {city}; skipping {category}");
            return Vec::new();
        };

        let nearby_doc = self.nearby.fetch_nearby(&coords, category, cache_only).await;
        let ids = location_ids(&nearby_doc);
        if ids.is_empty() {
            info!("no nearby {category} found for {city}");
            return Vec::new();
        }

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let details = self.details_for_category(id, category, cache_only).await;
            let photos = self.photos_for_category(id, category, cache_only).await;
            records.push(build_record(details.as_ref(), photos.as_ref(), category));
        }
        records
    }

    /// Details for one location as seen by one category request
    ///
    /// The category-scoped cache layer is checked first; on a miss the
    /// detail fetcher is consulted (it manages the category-agnostic
    /// layer), and a document obtained in live mode is copied under the
    /// category-scoped key. Cache-only mode never writes.
    async fn details_for_category(
        &self,
        id: &str,
        category: &str,
        cache_only: bool,
    ) -> Option<Value> {
        let key = details_key_for_category(id, category);
        if self.cache.exists(&key) {
            if let Some(document) = self.cache.read(&key) {
                info!("loading location details from cache: {key}");
                return Some(document);
            }
        }

        let document = self.locations.fetch_details(id, cache_only).await?;
        if !cache_only {
            if let Err(err) = self.cache.write(&key, &document) {
                warn!("could not cache {key}: {err}");
            }
        }
        Some(document)
    }

    /// Photos for one location as seen by one category request; same
    /// two-layer scheme as `details_for_category`.
    async fn photos_for_category(
        &self,
        id: &str,
        category: &str,
        cache_only: bool,
    ) -> Option<Value> {
        let key = photos_key_for_category(id, category);
        if self.cache.exists(&key) {
            if let Some(document) = self.cache.read(&key) {
                info!("loading location photos from cache: {key}");
                return Some(document);
            }
        }

        let document = self.locations.fetch_photos(id, cache_only).await?;
        if !cache_only {
            if let Err(err) = self.cache.write(&key, &document) {
                warn!("could not cache {key}: {err}");
            }
        }
        Some(document)
    }
}

/// Extracts the ordered location identifiers from a nearby-search document
fn location_ids(nearby: &Value) -> Vec<String> {
    let Some(items) = nearby.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| id_string(item.get("location_id")?))
        .collect()
}

/// Identifiers usually arrive as strings, but numbers show up in older
/// documents; both forms must map to the same cache keys.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds the flattened record for one location
///
/// Missing documents or missing fields become empty strings; `category` is
/// taken from the request, not the documents.
fn build_record(details: Option<&Value>, photos: Option<&Value>, category: &str) -> LocationRecord {
    let photo = photos
        .and_then(|doc| {
            doc.get("data")?
                .get(0)?
                .get("images")?
                .get("thumbnail")?
                .get("url")?
                .as_str()
        })
        .unwrap_or_default()
        .to_string();

    LocationRecord {
        name: text_at(details, &["name"]),
        address: text_at(details, &["address_obj", "address_string"]),
        url: text_at(details, &["web_url"]),
        category: category.to_string(),
        photo,
    }
}

/// Walks `path` into `document`, returning the string found there or ""
fn text_at(document: Option<&Value>, path: &[&str]) -> String {
    let mut current = match document {
        Some(value) => value,
        None => return String::new(),
    };
    for segment in path {
        match current.get(segment) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    current.as_str().unwrap_or_default().to_string()
}
