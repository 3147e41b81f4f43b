//! Storage and configuration directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/flux/`, `~/.cache/flux/session/`, `~/.local/share/flux/local/`
//! - macOS: `~/Library/Application Support/flux/`, `~/Library/Caches/flux/session/`
//! - Windows: `%APPDATA%\flux\`, `%LOCALAPPDATA%\flux\session\`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "flux";
const SESSION_DIR: &str = "session";
const LOCAL_DIR: &str = "local";

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;
    Ok(dir)
}

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    ensure_dir(base.join(APP_NAME))
}

/// Get the application cache directory
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    ensure_dir(base.join(APP_NAME))
}

/// Get the application data directory
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine data directory")?;
    ensure_dir(base.join(APP_NAME))
}

/// Directory for session-scoped storage
///
/// Lives under the cache directory unless `root` overrides it.
pub fn session_storage_dir(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(root) => ensure_dir(root.join(SESSION_DIR)),
        None => ensure_dir(cache_dir()?.join(SESSION_DIR)),
    }
}

/// Directory for durable local storage
///
/// Lives under the data directory unless `root` overrides it.
pub fn local_storage_dir(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(root) => ensure_dir(root.join(LOCAL_DIR)),
        None => ensure_dir(data_dir()?.join(LOCAL_DIR)),
    }
}

/// Get path to the global config file
pub fn global_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
