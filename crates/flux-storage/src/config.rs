//! Flux configuration
//!
//! Configuration loaded from a `.flux.toml` file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Well-known session key under which the whole state tree is cached
pub const DEFAULT_CACHE_KEY: &str = "nlFlux";

/// Flux configuration loaded from .flux.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FluxConfig {
    /// Log a before/after diff for every dispatched action
    #[serde(default)]
    pub debug: bool,

    /// Write the state tree through to session storage
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Session key holding the cached state tree
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// Root directory for file storage (platform directories when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

fn default_cache() -> bool {
    true
}

fn default_cache_key() -> String {
    DEFAULT_CACHE_KEY.to_string()
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            debug: false,
            cache: default_cache(),
            cache_key: default_cache_key(),
            storage_dir: None,
        }
    }
}

impl FluxConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded flux config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default flux config");
        Self::default()
    }
}
