//! Dispatcher options: debug reports and the session cache.

use flux_storage::config::DEFAULT_CACHE_KEY;
use flux_storage::FluxConfig;
use serde::{Deserialize, Serialize};

/// Construction options for [`Flux`](crate::Flux)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluxOptions {
    /// Report a before/after diff for every dispatched action
    #[serde(default)]
    pub debug: bool,

    /// Write the state tree through to session storage and seed from it
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Session key holding the cached state tree
    #[serde(default = "default_cache_key")]
    pub cache_key: String,
}

fn default_cache() -> bool {
    true
}

fn default_cache_key() -> String {
    DEFAULT_CACHE_KEY.to_string()
}

impl Default for FluxOptions {
    fn default() -> Self {
        Self {
            debug: false,
            cache: default_cache(),
            cache_key: default_cache_key(),
        }
    }
}

impl FluxOptions {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }
}

impl From<&FluxConfig> for FluxOptions {
    fn from(config: &FluxConfig) -> Self {
        Self {
            debug: config.debug,
            cache: config.cache,
            cache_key: config.cache_key.clone(),
        }
    }
}
