//! File-backed key-value store.
//!
//! The whole store lives in one JSON object (`{"key": "value", ...}`) on
//! disk. It is loaded once on [`FileStore::open`] and written through on
//! every mutation, via a temporary file and a rename so a crash never leaves
//! a half-written image behind.
//!
//! ## Sharing a file
//!
//! Stores do not coordinate with each other. Two stores opened on the same
//! path each rewrite the whole file from their own in-memory view, so the
//! last write wins and the other store's changes are lost on disk. Share one
//! store (behind an `Arc`) instead of opening the path twice.
//!
//! ## Quota
//!
//! Like a browser storage area, the store enforces a byte quota over the
//! sum of key and value lengths (default 5 MiB). A write that would exceed
//! it fails with [`StoreError::QuotaExceeded`] and changes nothing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitekit::{FileStore, FileStoreConfig, PersistentCache};
//!
//! let config = FileStoreConfig::new(1024 * 1024).unwrap();
//! let store = FileStore::open_with_config("state/ui.json", config).unwrap();
//! let cache = PersistentCache::new(store);
//!
//! let _ = cache.set("sidebar_open", &true);
//! ```

use crate::application::ports::{KeyValueStore, StoreError};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Error returned when a store configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Quota must be greater than zero
    ZeroQuota,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroQuota => write!(f, "quota must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStoreConfig {
    /// Maximum bytes held (keys plus values)
    pub quota_bytes: usize,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl FileStoreConfig {
    /// Create a config with the given quota.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroQuota` if `quota_bytes` is zero.
    pub fn new(quota_bytes: usize) -> Result<Self, ConfigError> {
        if quota_bytes == 0 {
            return Err(ConfigError::ZeroQuota);
        }
        Ok(Self { quota_bytes })
    }
}

/// Key-value store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    config: FileStoreConfig,
    entries: Mutex<BTreeMap<String, String>>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FileStore {
    /// Open the store at `path` with the default configuration.
    ///
    /// A missing file is an empty store; it is created on the first write.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be read and
    /// `StoreError::Corrupted` if it is not a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(path, FileStoreConfig::default())
    }

    /// Open the store at `path` with a custom configuration.
    ///
    /// # Errors
    /// See [`FileStore::open`].
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: FileStoreConfig,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = load(&path)?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened file store");

        Ok(Self {
            path,
            config,
            entries: Mutex::new(entries),
        })
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The store configuration.
    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    /// Bytes currently held (sum of key and value lengths).
    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = serde_json::to_string(entries)
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        atomic_write(&self.path, text.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();

        let previous_bytes = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let needed = used_bytes(&entries) - previous_bytes + key.len() + value.len();
        if needed > self.config.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                needed,
                quota: self.config.quota_bytes,
            });
        }

        let previous = entries.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();

        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries) {
            entries.insert(key.to_owned(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.lock();

        let previous = std::mem::take(&mut *entries);
        if let Err(e) = self.persist(&entries) {
            *entries = previous;
            return Err(e);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn load(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(StoreError::Io(e)),
    };

    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&text)
        .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))
}

/// Suffix counter for temp file names within this process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `content` to a sibling temp file, then rename it over `path`.
///
/// The temp name carries the process id and a per-process counter, so
/// concurrent writers never share a temp file.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "store path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp_path = parent.join(tmp_name);

    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir);
            store.set_item("theme", "\"dark\"").unwrap();
            store.set_item("count", "3").unwrap();
            store.remove_item("count").unwrap();
        }

        let store = store_in(&dir);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(store.get_item("count").unwrap(), None);
    }

    #[test]
    fn test_file_is_json_object() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_item("a", "1").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, r#"{"a":"1"}"#);
    }

    #[test]
    fn test_clear_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_item("a", "1").unwrap();
        store.clear().unwrap();
        drop(store);

        assert!(store_in(&dir).is_empty());
    }

    #[test]
    fn test_quota_exceeded_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let config = FileStoreConfig::new(8).unwrap();
        let store = FileStore::open_with_config(dir.path().join("s.json"), config).unwrap();

        store.set_item("k", "1234").unwrap();
        let err = store.set_item("big", "123456").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 14, quota: 8 }));

        assert_eq!(store.len(), 1);
        assert_eq!(store.used_bytes(), 5);
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(!text.contains("big"));
    }

    #[test]
    fn test_corrupted_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.json");
        let store = FileStore::open(&path).unwrap();

        store.set_item("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set_item("k", "v1").unwrap();

        // A non-empty directory at the store path makes the rename fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        assert!(matches!(store.set_item("k", "v2"), Err(StoreError::Io(_))));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v1"));

        assert!(store.remove_item("k").is_err());
        assert_eq!(store.len(), 1);

        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("store.json")]);
    }

    #[test]
    fn test_two_stores_on_one_path_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path).unwrap();

        first.set_item("a", "1").unwrap();
        second.set_item("b", "2").unwrap();
        first.set_item("c", "3").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get_item("c").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get_item("b").unwrap(), None);

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("store.json")]);
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(FileStoreConfig::new(0), Err(ConfigError::ZeroQuota));
        assert_eq!(FileStoreConfig::default().quota_bytes, 5 * 1024 * 1024);
    }
}
