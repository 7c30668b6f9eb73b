//! Store wrapper with switchable failures.

use crate::application::ports::{KeyValueStore, StoreError};
use std::sync::{Arc, Mutex};

/// How a [`FailingStore`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Writes fail with `QuotaExceeded`; reads and deletes work
    Quota,
    /// Every operation fails with `Unavailable`
    Unavailable,
}

/// Wraps a real store and injects errors on demand.
///
/// Clones share the failure switch.
#[derive(Debug, Clone)]
pub struct FailingStore<S> {
    inner: S,
    mode: Arc<Mutex<Option<FailureMode>>>,
}

impl<S> FailingStore<S>
where
    S: KeyValueStore,
{
    /// Wrap `inner`; no failures until [`fail_with`](Self::fail_with).
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mode: Arc::new(Mutex::new(None)),
        }
    }

    /// Start failing.
    pub fn fail_with(&self, mode: FailureMode) {
        *self
            .mode
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock") =
            Some(mode);
    }

    /// Stop failing.
    pub fn recover(&self) {
        *self
            .mode
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock") =
            None;
    }

    /// Get the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn mode(&self) -> Option<FailureMode> {
        *self
            .mode
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock")
    }

    fn check_read(&self) -> Result<(), StoreError> {
        match self.mode() {
            Some(FailureMode::Unavailable) => {
                Err(StoreError::Unavailable("injected failure".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn check_write(&self, needed: usize) -> Result<(), StoreError> {
        match self.mode() {
            Some(FailureMode::Quota) => Err(StoreError::QuotaExceeded { needed, quota: 0 }),
            Some(FailureMode::Unavailable) => {
                Err(StoreError::Unavailable("injected failure".to_string()))
            }
            None => Ok(()),
        }
    }
}

impl<S> KeyValueStore for FailingStore<S>
where
    S: KeyValueStore,
{
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_read()?;
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_write(key.len() + value.len())?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check_read()?;
        self.inner.remove_item(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_read()?;
        self.inner.clear()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
