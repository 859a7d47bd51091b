//! Keyed TTL cache shared by the registry client and the catalog service
//!
//! One cache is constructed per process and handed to components as
//! `Arc<TtlCache>`. Every entry carries its own expiry, so registry data
//! and the installed-package inventory age independently:
//!
//! | Key | Owner | TTL |
//! |-----|-------|-----|
//! | `registry:packages` | `RegistryClient::list_packages` | `cache-timeout` (3600 s) |
//! | `registry:package:<name>` | `RegistryClient::get_package_info` | `cache-timeout` (3600 s) |
//! | `inventory:installed` | `CatalogService::installed_inventory` | `inventory-timeout` (60 s) |
//!
//! Entries are stored as JSON values. A persistent cache is loaded from a
//! file once and written back by [`TtlCache::flush`], or when it is dropped,
//! if anything changed; separate CLI invocations share it and concurrent
//! writers race with last-write-wins.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// A cached value with its absolute expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide keyed cache with per-entry expiry
#[derive(Debug)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    store: Option<PathBuf>,
    dirty: AtomicBool,
}

impl TtlCache {
    /// Create a cache that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store: None,
            dirty: AtomicBool::new(false),
        }
    }

    /// Create a cache mirrored to `path`
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_store(&path).unwrap_or_default();
        debug!("Loaded {} cache entries from {:?}", entries.len(), path);
        Self {
            entries: Mutex::new(entries),
            store: Some(path),
            dirty: AtomicBool::new(false),
        }
    }

    fn load_store(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file {:?}: {}", path, e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("Ignoring corrupt cache file {:?}: {}", path, e);
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Write pending changes to the backing file
    ///
    /// Returns whether the file was written. In-memory caches and caches
    /// without changes since the last flush never touch the disk.
    pub fn flush(&self) -> bool {
        let Some(path) = &self.store else {
            return false;
        };
        let entries = self.lock();
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string(&*entries)?;
            let tmp = path.with_extension("tmp");
            std::fs::write(&tmp, content)?;
            std::fs::rename(&tmp, path)
        })();

        match result {
            Ok(()) => {
                debug!("Wrote {} cache entries to {:?}", entries.len(), path);
                true
            }
            Err(e) => {
                warn!("Failed to write cache file {:?}: {}", path, e);
                false
            }
        }
    }

    /// Fetch a live entry, decoding it as `T`
    ///
    /// Expired entries and entries that no longer decode are dropped.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if entry.is_expired(Utc::now()) {
            debug!("Cache entry expired: {}", key);
            entries.remove(key);
            self.mark_dirty();
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Dropping undecodable cache entry {}: {}", key, e);
                entries.remove(key);
                self.mark_dirty();
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`
    pub fn insert<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Not caching {}: {}", key, e);
                return;
            }
        };

        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.lock();
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        self.mark_dirty();
    }

    /// Drop one key; returns whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.lock();
        let removed = entries.remove(key).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Drop every key starting with `prefix`; returns the number removed
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }

    /// Drop everything
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.mark_dirty();
    }

    /// Number of entries that have not expired
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.lock().values().filter(|e| !e.is_expired(now)).count()
    }

    /// Whether no live entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        self.flush();
    }
}
