//! Storage backend trait and the in-process backends.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors a storage backend can report.
///
/// These never reach flux callers: `PersistedStore` logs and drops them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be used in this environment.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the underlying medium failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A key/value store for JSON values.
///
/// Implementations own the wire format: values go in as `serde_json::Value`
/// and must come back structurally equal.
pub trait StorageBackend: Send {
    /// Read the value stored under `key`, `Ok(None)` if missing.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Remove every key.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Whether the backend can be used at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-process storage holding JSON text.
///
/// Clones share the same underlying map, so a clone handed to a second
/// consumer sees everything the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw JSON text stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self.lock()?.get(key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        self.lock()?.insert(key.to_string(), text);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// A backend for environments without storage.
///
/// Every operation fails with `StorageError::Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
        Err(StorageError::Unavailable("no storage in this environment".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &Value) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no storage in this environment".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no storage in this environment".to_string()))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no storage in this environment".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}
