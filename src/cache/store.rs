//! Filesystem store for raw API responses
//!
//! Documents are opaque JSON values written verbatim under hierarchical
//! keys such as `data/location_details/123/details.json`. A cached document
//! is trusted indefinitely once present; there is no expiry and no locking,
//! so concurrent writers to the same key race and the last writer wins.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde_json::Value;
use tracing::warn;

/// Maps cache keys to JSON documents on durable storage
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory all keys are resolved against
    root: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at the XDG cache directory
    /// (`~/.cache/citypoi/` on Linux).
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "citypoi")?;
        Some(Self {
            root: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a store rooted at a specific directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the path a key resolves to
    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Whether a document exists under `key`
    pub fn exists(&self, key: &str) -> bool {
        self.key_path(key).is_file()
    }

    /// Reads the document stored under `key`
    ///
    /// Returns `None` if the file is missing or does not parse as JSON; an
    /// unreadable entry is reported and treated as a miss.
    pub fn read(&self, key: &str) -> Option<Value> {
        let path = self.key_path(key);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!("ignoring unreadable cache entry {}: {err}", path.display());
                None
            }
        }
    }

    /// Writes `document` under `key`, creating intermediate directories
    ///
    /// The document is serialized to a sibling temp file and renamed into
    /// place, so a racing reader never observes a partial write.
    ///
    /// # Arguments
    /// * `key` - Relative path for the entry (e.g. "data/photos/1/photos.json")
    /// * `document` - The JSON document to persist verbatim
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write(&self, key: &str, document: &Value) -> io::Result<()> {
        let path = self.key_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)
    }
}
