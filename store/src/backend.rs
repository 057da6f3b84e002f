//! Raw string storage behind [`PersistentStore`](crate::PersistentStore).
//!
//! Backends know nothing about JSON. They store opaque strings under string keys
//! and report failures; deciding what a failure means is the caller's job.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: u64, limit: u64 },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),
}

/// Injected storage port.
///
/// Implementations must be safe to share; the store is process-wide state and any
/// consumer may read or write any key.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Volatile backend for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    max_bytes: Option<u64>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total stored size past `max_bytes`.
    #[must_use]
    pub fn with_quota(max_bytes: u64) -> Self {
        Self {
            entries: Mutex::default(),
            max_bytes: Some(max_bytes),
        }
    }

    /// Store a raw value, bypassing any encoding. Lets tests plant corrupt data.
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.lock().insert(key.to_string(), raw.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        if let Some(limit) = self.max_bytes {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.len() + v.len()) as u64)
                .sum();
            let needed = others + (key.len() + value.len()) as u64;
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Layout: `{dir}/{encoded_key}.json`. Writes go to a temp file in the same
/// directory and are renamed into place, so a reader never sees a torn entry.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    max_bytes: Option<u64>,
}

impl FileBackend {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_bytes: None,
        })
    }

    #[must_use]
    pub fn with_quota(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }

    /// Bytes used by every entry except `skip`.
    fn usage_excluding(&self, skip: &Path) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .flatten()
            .filter(|e| e.path() != skip)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        if let Some(limit) = self.max_bytes {
            let needed = self.usage_excluding(&path) + value.len() as u64;
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Make an arbitrary key safe as a file name. Unreserved ASCII passes through,
/// everything else is percent-encoded byte by byte.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    if out.is_empty() {
        out.push('%');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_key_passes_plain_keys() {
        assert_eq!(encode_key("cached_quote"), "cached_quote");
        assert_eq!(encode_key("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_key(""), "%");
    }

    #[test]
    fn memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.get("k").unwrap().is_none());
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn memory_backend_enforces_quota() {
        let backend = MemoryBackend::with_quota(10);
        backend.set("a", "12345").unwrap();
        let err = backend.set("b", "1234567").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 10, .. }));
        // Overwriting an existing key only counts the new value.
        backend.set("a", "123456789").unwrap();
    }

    #[test]
    fn file_backend_overwrites_whole_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("cached_news", "{\"long\":\"value\"}").unwrap();
        backend.set("cached_news", "{}").unwrap();
        assert_eq!(backend.get("cached_news").unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("cached_news.json").exists());
    }

    #[test]
    fn file_backend_missing_key_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(backend.get("nope").unwrap().is_none());
        backend.remove("nope").unwrap();
    }

    #[test]
    fn file_backend_enforces_quota() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::open(dir.path()).unwrap().with_quota(Some(8));
        backend.set("a", "1234").unwrap();
        assert!(matches!(
            backend.set("b", "12345"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert!(backend.get("b").unwrap().is_none());
    }
}
