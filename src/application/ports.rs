//! Ports (interfaces) for the application layer.
//!
//! The wrappers and the cache depend on these traits only. Infrastructure
//! adapters implement them.

use std::fmt::{self, Debug};
use std::io;
use std::sync::Arc;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Error reported by a [`KeyValueStore`].
#[derive(Debug)]
pub enum StoreError {
    /// Writing the entry would push the store past its byte quota
    QuotaExceeded {
        /// Bytes the store would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },
    /// Reading or writing the backing medium failed
    Io(io::Error),
    /// The backing medium holds data that is not a valid store image
    Corrupted(String),
    /// The store cannot be reached at all
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::QuotaExceeded { needed, quota } => {
                write!(f, "quota exceeded: {} bytes needed, {} allowed", needed, quota)
            }
            StoreError::Io(e) => write!(f, "i/o error: {}", e),
            StoreError::Corrupted(e) => write!(f, "corrupted store: {}", e),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Port for a synchronous, text-keyed, text-valued persistent store.
///
/// Mirrors the shape of an origin-scoped browser storage area: string keys,
/// string values, no TTL and no namespacing. Implementations serialize their
/// own mutations, so a store can be shared through `Arc` by any number of
/// caches. Writers are not coordinated beyond that; the last write to a key
/// wins.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read the text stored under `key`, `None` if there is no entry.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the entry under `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every entry.
    fn clear(&self) -> Result<(), StoreError>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Check if the store has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::QuotaExceeded {
            needed: 12,
            quota: 10,
        };
        assert_eq!(
            err.to_string(),
            "quota exceeded: 12 bytes needed, 10 allowed"
        );

        let err = StoreError::from(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert!(err.to_string().contains("disk gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
