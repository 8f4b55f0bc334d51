//! Directory Cache
//!
//! Recent listings keyed by `(connection id, normalized path, encoding)`.
//! Connection ids are unique per connect attempt, so entries of a torn-down
//! connection can never be hit again; `purge` drops them to bound memory.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::types::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub connection_id: String,
    pub path: String,
    pub encoding: String,
}

impl CacheKey {
    pub fn new(
        connection_id: impl Into<String>,
        path: impl Into<String>,
        encoding: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            path: path.into(),
            encoding: encoding.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub files: Vec<FileEntry>,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(files: Vec<FileEntry>) -> Self {
        Self {
            files,
            timestamp: Utc::now(),
        }
    }

    /// Age relative to now; clock skew backwards counts as zero
    pub fn age(&self) -> Duration {
        (Utc::now() - self.timestamp).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Default)]
pub struct DirectoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Entry younger than `max_age`, if any
    pub fn get_fresh(&self, key: &CacheKey, max_age: Duration) -> Option<CacheEntry> {
        self.get(key).filter(|entry| entry.age() < max_age)
    }

    pub fn put(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Remove every entry of `connection_id`; returns how many were dropped
    pub fn purge(&self, connection_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.connection_id != connection_id);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Purged {} cached listings for connection {}", purged, connection_id);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry belongs to `connection_id`
    pub fn contains_connection(&self, connection_id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.key().connection_id == connection_id)
    }
}
