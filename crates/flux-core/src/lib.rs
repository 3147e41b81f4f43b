//! # flux-core
//!
//! Unidirectional state management: a dispatcher routes actions to a
//! registry of named stores, each store derives its next immutable slice,
//! and the aggregate state tree is available for reading.
//!
//! ## Dispatch cycle
//!
//! ```text
//! dispatch(action)
//!   │
//!   ├─ for each store, in registration order
//!   │    prior slice ──► Store::on_action ──► next slice
//!   │    state tree replaced (new snapshot)
//!   │    cache write-through (session storage)
//!   │    Store::set_state(next slice)
//!   │
//!   ├─ debug report (when debug mode is on)
//!   └─ event "<action type>" emitted with the payload
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use flux_core::{Flux, FluxOptions, Payload, Store};
//! use serde_json::{json, Value};
//!
//! struct Cart;
//!
//! impl Store for Cart {
//!     fn name(&self) -> &str {
//!         "cart"
//!     }
//!
//!     fn initial_state(&self) -> Option<Value> {
//!         Some(json!([]))
//!     }
//!
//!     fn on_action(
//!         &self,
//!         action_type: &str,
//!         payload: &Payload,
//!         state: &Value,
//!     ) -> anyhow::Result<Option<Value>> {
//!         if action_type != "ADD_ITEM" {
//!             return Ok(None);
//!         }
//!         let mut items = state.as_array().cloned().unwrap_or_default();
//!         items.push(payload["item"].clone());
//!         Ok(Some(Value::Array(items)))
//!     }
//! }
//!
//! let mut flux = Flux::new(FluxOptions::default());
//! flux.register_store(Cart);
//! flux.dispatch(json!({"type": "ADD_ITEM", "item": "apple"}));
//!
//! assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
//! ```

pub mod action;
pub mod debug;
pub mod event_bus;
pub mod flux;
pub mod options;
pub mod registry;
pub mod state_path;
pub mod state_tree;
pub mod store;
pub mod watcher;

// Re-export commonly used types
pub use action::{Action, ActionError, Payload};
pub use debug::{DebugReport, DebugSink, LogSink};
pub use event_bus::{EventBus, ListenerId};
pub use flux::Flux;
pub use options::FluxOptions;
pub use registry::{StoreEntry, StoreRegistry};
pub use state_path::StatePath;
pub use state_tree::{SliceChange, StateTree};
pub use store::Store;
pub use watcher::StateWatcher;
