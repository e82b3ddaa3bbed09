//! Cache module for storing API responses to disk
//!
//! This module persists raw upstream responses to the filesystem so that
//! repeated lookups avoid redundant network calls and cache-only runs can
//! operate fully offline from previously fetched data.

mod store;

pub use store::CacheStore;
