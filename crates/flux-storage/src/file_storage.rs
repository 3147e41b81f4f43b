//! File-backed storage
//!
//! Each key is persisted as its own JSON document inside a directory:
//!
//! ```text
//! <dir>/<sanitized key>.json
//! {
//!   "meta": { "last_modified": "...", "version": 1 },
//!   "value": <the stored JSON value>
//! }
//! ```
//!
//! A document is written to `<sanitized key>.json.tmp` first and renamed over
//! the real file, so readers see either the old or the new document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{StorageBackend, StorageError};

const STORAGE_VERSION: u32 = 1;
const FILE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Item metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMeta {
    pub last_modified: DateTime<Utc>,
    pub version: u32,
}

/// A stored item with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub meta: ItemMeta,
    pub value: Value,
}

impl StoredItem {
    fn new(value: Value) -> Self {
        Self {
            meta: ItemMeta {
                last_modified: Utc::now(),
                version: STORAGE_VERSION,
            },
            value,
        }
    }
}

/// Storage that keeps one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Session-scoped storage under the cache directory (or `root/session`)
    pub fn session(root: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self::new(crate::paths::session_storage_dir(root)?)?)
    }

    /// Durable local storage under the data directory (or `root/local`)
    pub fn local(root: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self::new(crate::paths::local_storage_dir(root)?)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced with `_`.
    pub fn item_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.{}", file_stem, FILE_EXTENSION))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension(format!("{}.{}", FILE_EXTENSION, TEMP_EXTENSION))
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let item: StoredItem = serde_json::from_str(&content)?;

        if item.meta.version > STORAGE_VERSION {
            log::warn!(
                "Ignoring {:?}: written by storage version {} (supported: {})",
                path,
                item.meta.version,
                STORAGE_VERSION
            );
            return Ok(None);
        }

        Ok(Some(item.value))
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        let path = self.item_path(key);
        let tmp = temp_path(&path);
        let content = serde_json::to_string_pretty(&StoredItem::new(value.clone()))?;
        fs::write(&tmp, content)?;

        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::trace!("Saved {:?}", path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.item_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let owned = path
                .extension()
                .is_some_and(|ext| ext == FILE_EXTENSION || ext == TEMP_EXTENSION);
            if owned {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
