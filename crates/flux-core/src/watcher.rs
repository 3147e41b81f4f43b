//! State watcher for UI bindings
//!
//! A binding reads one path of the state tree and needs to re-render only
//! when the value at that path changes. `StateWatcher` remembers what it last
//! handed out and reports new values only.

use serde_json::Value;

use crate::flux::Flux;
use crate::state_path::StatePath;

/// Watches one path of the state tree
#[derive(Debug, Clone)]
pub struct StateWatcher {
    path: Vec<String>,
    default: Value,
    last: Option<Value>,
}

impl StateWatcher {
    pub fn new<'p>(path: impl Into<StatePath<'p>>, default: Value) -> Self {
        let path = match path.into() {
            StatePath::Root => Vec::new(),
            StatePath::Key(key) => vec![key.to_string()],
            StatePath::Keys(keys) => keys.into_iter().map(str::to_string).collect(),
        };

        Self {
            path,
            default,
            last: None,
        }
    }

    /// Value at the watched path right now
    pub fn current(&self, flux: &Flux) -> Value {
        let keys: Vec<&str> = self.path.iter().map(String::as_str).collect();
        flux.get_state(keys, self.default.clone())
    }

    /// The current value if it differs from the last one returned
    ///
    /// The first poll always returns the current value.
    pub fn poll(&mut self, flux: &Flux) -> Option<Value> {
        let current = self.current(flux);
        if self.last.as_ref() == Some(&current) {
            return None;
        }

        self.last = Some(current.clone());
        Some(current)
    }

    /// Last value returned by [`poll`](Self::poll)
    pub fn last(&self) -> Option<&Value> {
        self.last.as_ref()
    }
}
