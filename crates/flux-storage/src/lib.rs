//! Configuration and storage persistence for flux
//!
//! This crate provides:
//! - Directory utilities for config, session and local storage
//! - Configuration file loading (TOML)
//! - Flux configuration (FluxConfig)
//! - Storage backends (in-memory, JSON files) behind the `StorageBackend` trait
//! - `PersistedStore`, the session/local facade that never fails its caller

pub mod backend;
pub mod config;
pub mod config_file;
pub mod file_storage;
pub mod paths;
pub mod persisted_store;

pub use backend::{MemoryStorage, StorageBackend, StorageError, UnavailableStorage};
pub use config::FluxConfig;
pub use config_file::load_config_file;
pub use file_storage::FileStorage;
pub use persisted_store::{PersistedStore, StorageScope};
