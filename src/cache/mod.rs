//! Persistent route cache
//!
//! Stores raw route durations keyed by rounded origin/destination pair in a
//! JSON file (`{ "<key>": { key, duration, distance?, timestamp } }`).
//! The file is read once when the cache is opened and rewritten after every
//! mutation.
//!
//! Expiry is lazy: reads never delete, callers ask for [`RouteCache::get_fresh`]
//! and stale entries are only removed by pruning. Pruning is oldest-first by
//! write time; reading an entry does not refresh it.

use crate::config::defaults::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_PRUNE_BATCH, DEFAULT_CACHE_TTL_SECS,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// A cached route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCacheEntry {
    pub key: String,

    /// Raw driving duration in seconds
    pub duration: f64,

    /// Driving distance in kilometers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Write time in epoch milliseconds
    pub timestamp: i64,
}

impl RouteCacheEntry {
    pub fn new(key: impl Into<String>, duration: f64, distance: Option<f64>, timestamp: i64) -> Self {
        Self {
            key: key.into(),
            duration,
            distance,
            timestamp,
        }
    }

    /// Whether the entry is still usable at `now_ms`
    ///
    /// An entry stamped in the future is never fresh.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let age = now_ms.saturating_sub(self.timestamp);
        (0..ttl.as_millis() as i64).contains(&age)
    }
}

/// Size and lifetime limits for the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub ttl: Duration,

    /// Prune once the entry count exceeds this
    pub max_entries: usize,

    /// Oldest entries dropped per prune
    pub prune_batch: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            prune_batch: DEFAULT_CACHE_PRUNE_BATCH,
        }
    }
}

/// Route cache backed by an optional JSON file
#[derive(Debug)]
pub struct RouteCache {
    entries: HashMap<String, RouteCacheEntry>,
    path: Option<PathBuf>,
    limits: CacheLimits,
}

impl RouteCache {
    /// A cache that is never written to disk
    pub fn in_memory(limits: CacheLimits) -> Self {
        Self {
            entries: HashMap::new(),
            path: None,
            limits,
        }
    }

    /// Open the cache stored at `path`
    ///
    /// A missing file gives an empty cache. So does an unreadable or corrupt
    /// one: the problem is logged and the file is overwritten on the next write.
    pub fn load_from(path: impl Into<PathBuf>, limits: CacheLimits) -> Self {
        let path = path.into();

        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load route cache, starting empty");
                HashMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Route cache loaded");

        Self {
            entries,
            path: Some(path),
            limits,
        }
    }

    fn read_entries(path: &Path) -> Result<HashMap<String, RouteCacheEntry>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Cache(format!("Failed to read cache file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Cache(format!("Failed to parse cache file: {}", e)))
    }

    /// Write the whole cache to its file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Cache(format!("Failed to create cache directory: {}", e))
            })?;
        }

        let content = serde_json::to_string(&self.entries)?;

        fs::write(path, content)
            .map_err(|e| Error::Cache(format!("Failed to write cache file: {}", e)))?;

        Ok(())
    }

    /// Persist after a mutation; failures only cost durability
    fn flush(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist route cache");
        }
    }

    /// Get an entry regardless of age
    pub fn get(&self, key: &str) -> Option<&RouteCacheEntry> {
        self.entries.get(key)
    }

    /// Get an entry only if it is younger than the TTL at `now_ms`
    pub fn get_fresh(&self, key: &str, now_ms: i64) -> Option<&RouteCacheEntry> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now_ms, self.limits.ttl))
    }

    /// Insert or replace an entry, prune if over capacity, then persist
    pub fn put(&mut self, entry: RouteCacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
        self.prune_oldest();
        self.flush();
    }

    /// Evict the oldest batch if over capacity and persist
    ///
    /// Returns the number of evicted entries.
    pub fn prune(&mut self) -> usize {
        let removed = self.prune_oldest();
        if removed > 0 {
            self.flush();
        }
        removed
    }

    fn prune_oldest(&mut self) -> usize {
        if self.entries.len() <= self.limits.max_entries {
            return 0;
        }

        let mut by_age: Vec<(i64, String)> = self
            .entries
            .values()
            .map(|e| (e.timestamp, e.key.clone()))
            .collect();
        by_age.sort();

        let count = self.limits.prune_batch.max(1).min(by_age.len());
        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }

        debug!(removed = count, remaining = self.entries.len(), "Pruned route cache");
        count
    }

    /// Drop every entry older than the TTL and persist
    ///
    /// Returns the number of removed entries.
    pub fn prune_expired(&mut self, now_ms: i64) -> usize {
        let ttl = self.limits.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now_ms, ttl));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.flush();
        }
        removed
    }

    /// Remove all entries and persist
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    /// Entries sorted newest first
    pub fn entries(&self) -> Vec<&RouteCacheEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINUTE_MS: i64 = 60 * 1000;

    fn limits(max_entries: usize, prune_batch: usize) -> CacheLimits {
        CacheLimits {
            ttl: Duration::from_secs(30 * 60),
            max_entries,
            prune_batch,
        }
    }

    fn entry(key: &str, timestamp: i64) -> RouteCacheEntry {
        RouteCacheEntry::new(key, 3600.0, Some(80.0), timestamp)
    }

    fn create_test_cache() -> (RouteCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("route_cache.json");
        (RouteCache::load_from(path, CacheLimits::default()), temp_dir)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let (mut cache, _temp) = create_test_cache();
        cache.put(entry("a", 1_000));

        let hit = cache.get_fresh("a", 1_000 + 29 * MINUTE_MS).unwrap();
        assert_eq!(hit.duration, 3600.0);
        assert_eq!(hit.distance, Some(80.0));
    }

    #[test]
    fn test_expired_entry_is_not_fresh_but_kept() {
        let (mut cache, _temp) = create_test_cache();
        cache.put(entry("a", 0));

        assert!(cache.get_fresh("a", 30 * MINUTE_MS).is_none());
        assert!(cache.get_fresh("a", 45 * MINUTE_MS).is_none());
        // Lazy expiry: still present until pruned
        assert!(cache.get("a").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_future_stamped_entry_is_not_fresh() {
        let (mut cache, _temp) = create_test_cache();
        cache.put(entry("a", 10 * MINUTE_MS));

        assert!(cache.get_fresh("a", 0).is_none());
        assert!(cache.get_fresh("a", 10 * MINUTE_MS).is_some());
        assert_eq!(cache.prune_expired(0), 1);
    }

    #[test]
    fn test_persisted_on_put() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("route_cache.json");

        {
            let mut cache = RouteCache::load_from(&path, CacheLimits::default());
            cache.put(entry("a", 5));
            cache.put(RouteCacheEntry::new("b", 60.0, None, 6));
        }

        let reloaded = RouteCache::load_from(&path, CacheLimits::default());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("a"), Some(&entry("a", 5)));
        assert_eq!(reloaded.get("b").unwrap().distance, None);
    }

    #[test]
    fn test_file_format_is_keyed_object() {
        let (mut cache, _temp) = create_test_cache();
        cache.put(entry("25.0621,121.1963-24.0000,121.5000", 42));

        let raw = fs::read_to_string(cache.path().unwrap()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let stored = &json["25.0621,121.1963-24.0000,121.5000"];

        assert_eq!(stored["key"], "25.0621,121.1963-24.0000,121.5000");
        assert_eq!(stored["duration"], 3600.0);
        assert_eq!(stored["distance"], 80.0);
        assert_eq!(stored["timestamp"], 42);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("route_cache.json");
        fs::write(&path, "{ not json").unwrap();

        let mut cache = RouteCache::load_from(&path, CacheLimits::default());
        assert!(cache.is_empty());

        // Next write replaces the corrupt file
        cache.put(entry("a", 1));
        let reloaded = RouteCache::load_from(&path, CacheLimits::default());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_prune_evicts_oldest_batch() {
        let mut cache = RouteCache::in_memory(limits(5, 2));
        for i in 0..5 {
            cache.put(entry(&format!("k{}", i), i * 10));
        }
        assert_eq!(cache.len(), 5);

        // Sixth entry pushes over the ceiling; the two oldest go
        cache.put(entry("k5", 50));

        assert_eq!(cache.len(), 4);
        assert!(cache.get("k0").is_none());
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k2").is_some());
        assert!(cache.get("k5").is_some());
    }

    #[test]
    fn test_reads_do_not_refresh_recency() {
        let mut cache = RouteCache::in_memory(limits(2, 1));
        cache.put(entry("old", 1));
        cache.put(entry("new", 2));

        let _ = cache.get_fresh("old", 3);
        cache.put(entry("newest", 3));

        assert!(cache.get("old").is_none());
        assert!(cache.get("new").is_some());
    }

    #[test]
    fn test_prune_below_ceiling_is_noop() {
        let mut cache = RouteCache::in_memory(limits(10, 5));
        cache.put(entry("a", 1));
        assert_eq!(cache.prune(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prune_expired() {
        let mut cache = RouteCache::in_memory(CacheLimits::default());
        cache.put(entry("stale", 0));
        cache.put(entry("fresh", 40 * MINUTE_MS));

        let removed = cache.prune_expired(45 * MINUTE_MS);

        assert_eq!(removed, 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn test_clear_persists() {
        let (mut cache, _temp) = create_test_cache();
        cache.put(entry("a", 1));
        cache.clear();

        let reloaded = RouteCache::load_from(cache.path().unwrap(), CacheLimits::default());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_entries_newest_first() {
        let mut cache = RouteCache::in_memory(CacheLimits::default());
        cache.put(entry("a", 1));
        cache.put(entry("c", 3));
        cache.put(entry("b", 2));

        let keys: Vec<_> = cache.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["c", "b", "a"]);
    }
}
