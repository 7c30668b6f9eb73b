//! In-memory key-value store.

use crate::application::ports::{KeyValueStore, StoreError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Thread-safe in-memory store backed by DashMap.
///
/// Share it process-wide through `Arc<MemoryStore>`. An optional byte quota
/// (sum of key and value lengths) mimics the limit of a browser storage
/// area.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<String, String>,
    quota: Option<usize>,
    used_bytes: AtomicUsize,
    // Serializes quota accounting; reads never take it.
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Bytes currently held (sum of key and value lengths).
    pub fn used_bytes(&self) -> usize {
        self.used_bytes.load(Ordering::Relaxed)
    }

    /// Iterate over all keys currently held.
    pub fn keys(&self) -> Vec<String> {
        self.map.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let previous = self
            .map
            .get(key)
            .map(|entry| key.len() + entry.value().len())
            .unwrap_or(0);
        let needed = self.used_bytes() - previous + key.len() + value.len();

        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        self.map.insert(key.to_owned(), value.to_owned());
        self.used_bytes.store(needed, Ordering::Relaxed);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((k, v)) = self.map.remove(key) {
            self.used_bytes
                .fetch_sub(k.len() + v.len(), Ordering::Relaxed);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.map.clear();
        self.used_bytes.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
