//! Outcome types for cache operations.
//!
//! The cache never surfaces a failure the caller has to handle. Reads report
//! [`Absent`] for both a miss and an unreadable entry; writes report a
//! [`LoggedError`] that has already been written to the log and exists only
//! so tests and curious callers can look at it.

use std::fmt;

/// The "no value" result of a cache read.
///
/// A genuine miss and an entry that could not be read or decoded look the
/// same to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Absent;

impl fmt::Display for Absent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no value")
    }
}

impl std::error::Error for Absent {}

/// What went wrong in a cache operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheErrorKind {
    /// The value could not be turned into text
    Serialize(String),
    /// The stored text could not be turned back into a value
    Deserialize(String),
    /// The underlying store rejected the operation
    Store(String),
}

impl fmt::Display for CacheErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheErrorKind::Serialize(e) => write!(f, "serialization failed: {}", e),
            CacheErrorKind::Deserialize(e) => write!(f, "deserialization failed: {}", e),
            CacheErrorKind::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

/// A cache failure that has already been logged.
///
/// Returned from `set`, `remove` and `clear`. Callers discard it by
/// convention (`let _ = cache.set(..)`); the failure is already on record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedError {
    key: Option<String>,
    kind: CacheErrorKind,
}

impl LoggedError {
    pub(crate) fn new(key: Option<&str>, kind: CacheErrorKind) -> Self {
        Self {
            key: key.map(str::to_owned),
            kind,
        }
    }

    /// The key the failed operation targeted, `None` for `clear`.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// What went wrong.
    pub fn kind(&self) -> &CacheErrorKind {
        &self.kind
    }
}

impl fmt::Display for LoggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "cache operation on '{}' failed: {}", key, self.kind),
            None => write!(f, "cache operation failed: {}", self.kind),
        }
    }
}

impl std::error::Error for LoggedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_error_display() {
        let err = LoggedError::new(Some("prefs"), CacheErrorKind::Store("quota".into()));
        assert_eq!(err.key(), Some("prefs"));
        assert_eq!(
            err.to_string(),
            "cache operation on 'prefs' failed: store error: quota"
        );

        let err = LoggedError::new(None, CacheErrorKind::Store("io".into()));
        assert_eq!(err.key(), None);
        assert_eq!(err.to_string(), "cache operation failed: store error: io");
    }

    #[test]
    fn test_absent_display() {
        assert_eq!(Absent.to_string(), "no value");
    }
}
