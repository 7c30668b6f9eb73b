//! Typed cache over a text key-value store.
//!
//! Values are serialized to JSON text on the way in and parsed on the way
//! out. The cache never hands a failure to its caller: every error is logged
//! with the offending key and the operation degrades to "no effect" (writes)
//! or [`Absent`] (reads).

use crate::application::ports::KeyValueStore;
use crate::domain::outcome::{Absent, CacheErrorKind, LoggedError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed wrapper over a [`KeyValueStore`].
///
/// The cache holds no state of its own. Several caches may share one store
/// (`Arc<S>` implements the port); the last write to a key wins.
///
/// # Example
/// ```
/// use sitekit::{Absent, MemoryStore, PersistentCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Prefs {
///     theme: String,
/// }
///
/// let cache = PersistentCache::new(MemoryStore::new());
/// let _ = cache.set("prefs", &Prefs { theme: "dark".into() });
///
/// let prefs: Prefs = cache.get("prefs").unwrap();
/// assert_eq!(prefs.theme, "dark");
/// assert_eq!(cache.get::<Prefs>("missing"), Err(Absent));
/// ```
#[derive(Debug, Clone)]
pub struct PersistentCache<S>
where
    S: KeyValueStore,
{
    store: S,
}

impl<S> PersistentCache<S>
where
    S: KeyValueStore,
{
    /// Create a cache over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// Serialization and store failures (including quota errors) are logged
    /// and returned as a [`LoggedError`]; callers normally discard it.
    pub fn set<T>(&self, key: &str, value: &T) -> Result<(), LoggedError>
    where
        T: Serialize + ?Sized,
    {
        let text = serde_json::to_string(value).map_err(|e| {
            logged(Some(key), CacheErrorKind::Serialize(e.to_string()), "cache write failed")
        })?;

        self.store.set_item(key, &text).map_err(|e| {
            logged(Some(key), CacheErrorKind::Store(e.to_string()), "cache write failed")
        })
    }

    /// Read and deserialize the value under `key`.
    ///
    /// A missing entry, a store read error and text that does not parse as
    /// `T` all yield [`Absent`]. The latter two are logged.
    pub fn get<T>(&self, key: &str) -> Result<T, Absent>
    where
        T: DeserializeOwned,
    {
        let text = match self.store.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => return Err(Absent),
            Err(e) => {
                logged(Some(key), CacheErrorKind::Store(e.to_string()), "cache read failed");
                return Err(Absent);
            }
        };

        serde_json::from_str(&text).map_err(|e| {
            logged(
                Some(key),
                CacheErrorKind::Deserialize(e.to_string()),
                "cache read failed",
            );
            Absent
        })
    }

    /// Read the value under `key`, or `T::default()` if there is none.
    pub fn get_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Whether an entry exists under `key`, regardless of whether it parses.
    pub fn contains(&self, key: &str) -> bool {
        match self.store.get_item(key) {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                logged(Some(key), CacheErrorKind::Store(e.to_string()), "cache read failed");
                false
            }
        }
    }

    /// Delete the entry under `key` if present.
    pub fn remove(&self, key: &str) -> Result<(), LoggedError> {
        self.store.remove_item(key).map_err(|e| {
            logged(Some(key), CacheErrorKind::Store(e.to_string()), "cache remove failed")
        })
    }

    /// Delete every entry in the underlying store.
    pub fn clear(&self) -> Result<(), LoggedError> {
        self.store
            .clear()
            .map_err(|e| logged(None, CacheErrorKind::Store(e.to_string()), "cache clear failed"))
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn logged(key: Option<&str>, kind: CacheErrorKind, message: &'static str) -> LoggedError {
    match key {
        Some(key) => tracing::warn!(key, error = %kind, "{}", message),
        None => tracing::warn!(error = %kind, "{}", message),
    }
    LoggedError::new(key, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{FailingStore, FailureMode, MockCaptureLayer};
    use crate::infrastructure::storage::MemoryStore;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        font_size: u8,
    }

    #[test]
    fn test_round_trip() {
        let cache = PersistentCache::new(MemoryStore::new());

        cache.set("k", &json!({ "a": 1 })).unwrap();
        let value: Value = cache.get("k").unwrap();
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn test_round_trip_struct() {
        let cache = PersistentCache::new(MemoryStore::new());
        let prefs = Prefs {
            theme: "dark".to_string(),
            font_size: 14,
        };

        cache.set("prefs", &prefs).unwrap();
        assert_eq!(cache.get::<Prefs>("prefs"), Ok(prefs));
    }

    #[test]
    fn test_stored_as_json_text() {
        let store = Arc::new(MemoryStore::new());
        let cache = PersistentCache::new(Arc::clone(&store));

        cache.set("list", &vec![1, 2, 3]).unwrap();
        assert_eq!(store.get_item("list").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_miss_is_absent() {
        let cache = PersistentCache::new(MemoryStore::new());
        assert_eq!(cache.get::<Value>("missing"), Err(Absent));
        assert!(!cache.contains("missing"));
    }

    #[test]
    fn test_clear() {
        let cache = PersistentCache::new(MemoryStore::new());
        cache.set("k", &"v").unwrap();
        cache.set("other", &1).unwrap();

        cache.clear().unwrap();

        assert_eq!(cache.get::<String>("k"), Err(Absent));
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_remove() {
        let cache = PersistentCache::new(MemoryStore::new());
        cache.set("k", &1).unwrap();
        cache.set("keep", &2).unwrap();

        cache.remove("k").unwrap();
        cache.remove("never-set").unwrap();

        assert_eq!(cache.get::<i32>("k"), Err(Absent));
        assert_eq!(cache.get::<i32>("keep"), Ok(2));
    }

    #[test]
    fn test_get_or_default() {
        let cache = PersistentCache::new(MemoryStore::new());
        let counts: BTreeMap<String, u32> = cache.get_or_default("counts");
        assert!(counts.is_empty());

        cache.set("n", &5u32).unwrap();
        assert_eq!(cache.get_or_default::<u32>("n"), 5);
    }

    #[test]
    fn test_set_store_failure_is_logged_not_raised() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let store = FailingStore::new(MemoryStore::new());
        store.fail_with(FailureMode::Quota);
        let cache = PersistentCache::new(store);

        let err = tracing::subscriber::with_default(subscriber, || {
            cache.set("draft", &"x".repeat(64)).unwrap_err()
        });

        assert_eq!(err.key(), Some("draft"));
        assert!(matches!(err.kind(), CacheErrorKind::Store(_)));

        let events = capture.get_captured();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].field("key"), Some("draft"));

        cache.store().recover();
        assert_eq!(cache.get::<String>("draft"), Err(Absent));
    }

    #[test]
    fn test_serialize_failure() {
        let cache = PersistentCache::new(MemoryStore::new());

        // JSON object keys must be strings
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "tuple key");

        let err = cache.set("bad", &bad).unwrap_err();
        assert!(matches!(err.kind(), CacheErrorKind::Serialize(_)));
        assert!(!cache.contains("bad"));
    }

    #[test]
    fn test_corrupted_entry_is_absent_and_logged() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let store = MemoryStore::new();
        store.set_item("prefs", "{not json").unwrap();
        let cache = PersistentCache::new(store);

        let result = tracing::subscriber::with_default(subscriber, || cache.get::<Prefs>("prefs"));

        assert_eq!(result, Err(Absent));
        let events = capture.get_captured();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("key"), Some("prefs"));
        // The raw entry is left in place
        assert!(cache.contains("prefs"));
    }

    #[test]
    fn test_wrong_shape_is_absent() {
        let cache = PersistentCache::new(MemoryStore::new());
        cache.set("n", &42).unwrap();
        assert_eq!(cache.get::<Prefs>("n"), Err(Absent));
    }

    #[test]
    fn test_read_failure_is_absent() {
        let store = FailingStore::new(MemoryStore::new());
        let cache = PersistentCache::new(store);
        cache.set("k", &1).unwrap();

        cache.store().fail_with(FailureMode::Unavailable);
        assert_eq!(cache.get::<i32>("k"), Err(Absent));
        assert!(!cache.contains("k"));
        assert!(cache.remove("k").is_err());
        assert!(cache.clear().unwrap_err().key().is_none());

        cache.store().recover();
        assert_eq!(cache.get::<i32>("k"), Ok(1));
    }

    #[test]
    fn test_shared_store_last_writer_wins() {
        let store = Arc::new(MemoryStore::new());
        let a = PersistentCache::new(Arc::clone(&store));
        let b = PersistentCache::new(Arc::clone(&store));

        a.set("k", &"from a").unwrap();
        b.set("k", &"from b").unwrap();

        assert_eq!(a.get::<String>("k").unwrap(), "from b");
    }
}
