//! Session and local storage facade
//!
//! `PersistedStore` pairs a session-scoped backend (cleared when the session
//! ends) with a durable local backend. It is the boundary where storage
//! failures stop: reads degrade to `None`, writes degrade to no-ops, and the
//! cause is logged.

use serde_json::Value;
use std::fmt;

use crate::backend::{MemoryStorage, StorageBackend, UnavailableStorage};

/// The two storage scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Cleared at the end of the session
    Session,
    /// Durable across sessions
    Local,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Session => write!(f, "session"),
            StorageScope::Local => write!(f, "local"),
        }
    }
}

/// Session + local key/value storage that never fails its caller
pub struct PersistedStore {
    session: Box<dyn StorageBackend>,
    local: Box<dyn StorageBackend>,
}

impl PersistedStore {
    pub fn new(session: Box<dyn StorageBackend>, local: Box<dyn StorageBackend>) -> Self {
        Self { session, local }
    }

    /// Both scopes held in memory for the lifetime of the process
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), Box::new(MemoryStorage::new()))
    }

    /// No storage at all: reads are `None`, writes are dropped
    pub fn unavailable() -> Self {
        Self::new(Box::new(UnavailableStorage), Box::new(UnavailableStorage))
    }

    fn backend(&self, scope: StorageScope) -> &dyn StorageBackend {
        match scope {
            StorageScope::Session => self.session.as_ref(),
            StorageScope::Local => self.local.as_ref(),
        }
    }

    fn backend_mut(&mut self, scope: StorageScope) -> &mut dyn StorageBackend {
        match scope {
            StorageScope::Session => self.session.as_mut(),
            StorageScope::Local => self.local.as_mut(),
        }
    }

    pub fn is_available(&self, scope: StorageScope) -> bool {
        self.backend(scope).is_available()
    }

    /// Read `key` from `scope`
    pub fn get(&self, scope: StorageScope, key: &str) -> Option<Value> {
        let backend = self.backend(scope);
        if !backend.is_available() {
            return None;
        }

        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {} data '{}': {}", scope, key, e);
                None
            }
        }
    }

    /// Write `value` under `key` in `scope`
    pub fn set(&mut self, scope: StorageScope, key: &str, value: &Value) {
        let backend = self.backend_mut(scope);
        if !backend.is_available() {
            return;
        }

        if let Err(e) = backend.set(key, value) {
            log::warn!("Failed to write {} data '{}': {}", scope, key, e);
        }
    }

    /// Remove `key` from `scope`
    pub fn delete(&mut self, scope: StorageScope, key: &str) {
        let backend = self.backend_mut(scope);
        if !backend.is_available() {
            return;
        }

        if let Err(e) = backend.remove(key) {
            log::warn!("Failed to remove {} data '{}': {}", scope, key, e);
        }
    }

    /// Drop everything stored in `scope`
    pub fn clear(&mut self, scope: StorageScope) {
        let backend = self.backend_mut(scope);
        if !backend.is_available() {
            return;
        }

        if let Err(e) = backend.clear() {
            log::warn!("Failed to clear {} storage: {}", scope, e);
        }
    }

    pub fn get_session_data(&self, key: &str) -> Option<Value> {
        self.get(StorageScope::Session, key)
    }

    pub fn set_session_data(&mut self, key: &str, value: &Value) {
        self.set(StorageScope::Session, key, value)
    }

    pub fn del_session_data(&mut self, key: &str) {
        self.delete(StorageScope::Session, key)
    }

    pub fn get_local_data(&self, key: &str) -> Option<Value> {
        self.get(StorageScope::Local, key)
    }

    pub fn set_local_data(&mut self, key: &str, value: &Value) {
        self.set(StorageScope::Local, key, value)
    }

    pub fn del_local_data(&mut self, key: &str) {
        self.delete(StorageScope::Local, key)
    }
}

impl Default for PersistedStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for PersistedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedStore")
            .field("session_available", &self.session.is_available())
            .field("local_available", &self.local.is_available())
            .finish()
    }
}
