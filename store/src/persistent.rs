//! Typed JSON access over a [`StorageBackend`].
//!
//! Reads never fail: absence, backend errors, and decode failures all yield the
//! caller's default. Writes are best-effort: failures are logged and swallowed.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::backend::{StorageBackend, StorageError};

#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Decode the value stored under `key`, or compute `default` if it is absent,
    /// empty, unreadable, or not valid JSON for `T`.
    pub fn read<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.try_read(key).unwrap_or_else(default)
    }

    pub fn read_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.read(key, T::default)
    }

    /// Like [`read`](Self::read) but reports a miss as `None` instead of
    /// substituting a default. Failures are still logged, never returned.
    pub fn try_read<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                warn!(key, "Failed to read from storage: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Stored value is not valid JSON for this key: {e}");
                None
            }
        }
    }

    /// Serialize and store `value` under `key`. Never fails the caller.
    pub fn write<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        if let Err(e) = self.try_write(key, value) {
            warn!(key, "Failed to write to storage: {e}");
        }
    }

    /// Fallible write for callers that want to react to the failure themselves.
    pub fn try_write<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(value)?;
        self.backend.set(key, &encoded)
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!(key, "Failed to remove from storage: {e}");
        }
    }
}
