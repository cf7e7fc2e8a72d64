//! In-memory key-value store - the default when no data directory is set.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use quill_core::ports::{KeyValueStore, StorageError};

/// In-memory store using a simple HashMap behind a RwLock.
///
/// Optionally enforces a byte quota on the total stored size.
/// Note: Data is lost on process restart.
pub struct InMemoryKeyValueStore {
    store: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    writes: AtomicUsize,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            quota: None,
            writes: AtomicUsize::new(0),
        }
    }

    /// Store that rejects writes pushing the total size past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::new()
        }
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn poisoned<T>(_: T) -> StorageError {
        StorageError::Unavailable("lock poisoned".to_string())
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let store = self.store.read().map_err(Self::poisoned)?;
        Ok(store.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut store = self.store.write().map_err(Self::poisoned)?;

        if let Some(quota) = self.quota {
            let others: usize = store
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{needed} bytes needed, {quota} allowed"
                )));
            }
        }

        store.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = InMemoryKeyValueStore::new();
        store.set("key1", "value1").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some("value1".to_string()));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_overwrite() {
        let store = InMemoryKeyValueStore::new();
        store.set("key1", "value1").unwrap();
        store.set("key1", "value2").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some("value2".to_string()));
    }

    #[test]
    fn test_quota_keeps_previous_value() {
        let store = InMemoryKeyValueStore::with_quota(16);
        store.set("k", "short").unwrap();

        let err = store.set("k", "far too long for the quota").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded(_)));
        assert_eq!(store.get("k").unwrap(), Some("short".to_string()));
        assert_eq!(store.writes(), 1);
    }
}
