use serde_json::Value;

use crate::action::Payload;

/// Store - an application-defined reducer over one slice of the state tree
///
/// Stores are registered with [`Flux`](crate::Flux) under their lowercased
/// [`name`](Store::name). On every dispatch the dispatcher hands each store
/// the action and the store's prior slice and keeps whatever it returns.
///
/// # Example
///
/// ```rust
/// use flux_core::{Payload, Store};
/// use serde_json::{json, Value};
///
/// struct Counter;
///
/// impl Store for Counter {
///     fn name(&self) -> &str {
///         "counter"
///     }
///
///     fn initial_state(&self) -> Option<Value> {
///         Some(json!({"count": 0}))
///     }
///
///     fn on_action(
///         &self,
///         action_type: &str,
///         _payload: &Payload,
///         state: &Value,
///     ) -> anyhow::Result<Option<Value>> {
///         let count = state["count"].as_i64().unwrap_or(0);
///         Ok(match action_type {
///             "INCREMENT" => Some(json!({"count": count + 1})),
///             _ => None,
///         })
///     }
/// }
/// ```
pub trait Store: Send {
    /// Name the store is registered under (compared case-insensitively)
    fn name(&self) -> &str;

    /// Slice used when nothing is cached or already in the state tree
    ///
    /// `None` seeds an empty object.
    fn initial_state(&self) -> Option<Value> {
        None
    }

    /// Compute the next slice
    ///
    /// Must be a pure function of its inputs. Returning `Ok(None)` or a falsy
    /// value (`null`, `false`, `0`, `""`) keeps `state` unchanged. An error is
    /// logged and also keeps `state`; the other stores still run.
    fn on_action(
        &self,
        action_type: &str,
        payload: &Payload,
        state: &Value,
    ) -> anyhow::Result<Option<Value>>;

    /// Called by the dispatcher with the slice the store now owns
    fn set_state(&mut self, _state: &Value) {}
}
