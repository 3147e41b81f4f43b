//! Demo stores: a shopping cart and the orders placed from it.

use anyhow::{bail, Context};
use flux_core::{Payload, Store};
use serde_json::{json, Value};

pub const ADD_ITEM: &str = "ADD_ITEM";
pub const REMOVE_ITEM: &str = "REMOVE_ITEM";
pub const CHECKOUT: &str = "CHECKOUT";

fn item(payload: &Payload) -> anyhow::Result<&str> {
    payload
        .get("item")
        .and_then(Value::as_str)
        .context("payload has no `item` string")
}

/// Ordered list of item names
#[derive(Debug, Default)]
pub struct CartStore {
    /// Number of items after the last update
    size: usize,
}

impl Store for CartStore {
    fn name(&self) -> &str {
        "Cart"
    }

    fn initial_state(&self) -> Option<Value> {
        Some(json!([]))
    }

    fn on_action(
        &self,
        action_type: &str,
        payload: &Payload,
        state: &Value,
    ) -> anyhow::Result<Option<Value>> {
        let mut items = state.as_array().cloned().unwrap_or_default();

        match action_type {
            ADD_ITEM => items.push(Value::from(item(payload)?)),
            REMOVE_ITEM => {
                let name = item(payload)?;
                let Some(index) = items.iter().position(|i| i.as_str() == Some(name)) else {
                    bail!("{} is not in the cart", name);
                };
                items.remove(index);
            }
            CHECKOUT => items.clear(),
            _ => return Ok(None),
        }

        Ok(Some(Value::Array(items)))
    }

    fn set_state(&mut self, state: &Value) {
        self.size = state.as_array().map_or(0, Vec::len);
        log::debug!("Cart now holds {} item(s)", self.size);
    }
}

/// Placed orders: `{"count": n, "last": [items]}`
#[derive(Debug, Default)]
pub struct OrdersStore;

impl Store for OrdersStore {
    fn name(&self) -> &str {
        "Orders"
    }

    fn initial_state(&self) -> Option<Value> {
        Some(json!({"count": 0, "last": []}))
    }

    fn on_action(
        &self,
        action_type: &str,
        payload: &Payload,
        state: &Value,
    ) -> anyhow::Result<Option<Value>> {
        if action_type != CHECKOUT {
            return Ok(None);
        }

        let count = state.get("count").and_then(Value::as_u64).unwrap_or(0);
        let last = payload.get("items").cloned().unwrap_or_else(|| json!([]));
        Ok(Some(json!({"count": count + 1, "last": last})))
    }
}
