//! Immutable state tree
//!
//! A `StateTree` maps store names to their slices. Snapshots are shared
//! through an `Arc` and never mutated: every update builds a new map, so a
//! snapshot handed to a reader stays valid and two snapshots compare by value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One store-level difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceChange {
    Added(String),
    Removed(String),
    Changed(String),
}

impl SliceChange {
    pub fn name(&self) -> &str {
        match self {
            SliceChange::Added(name) | SliceChange::Removed(name) | SliceChange::Changed(name) => {
                name
            }
        }
    }
}

impl fmt::Display for SliceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceChange::Added(name) => write!(f, "+ {}", name),
            SliceChange::Removed(name) => write!(f, "- {}", name),
            SliceChange::Changed(name) => write!(f, "~ {}", name),
        }
    }
}

/// Snapshot of every store's slice
#[derive(Clone, Default)]
pub struct StateTree {
    slices: Arc<BTreeMap<String, Value>>,
}

impl StateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slices.contains_key(name)
    }

    /// Slice stored under `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slices.get(name)
    }

    /// Deep lookup: the first segment selects a slice, the rest index into it
    ///
    /// Object segments are keys; array segments are decimal indices.
    /// An empty path yields `None`.
    pub fn get_in<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.get(first.as_ref())?, |value, segment| {
                index_value(value, segment.as_ref())
            })
    }

    /// New snapshot with `name` set to `value`
    pub fn with_slice(&self, name: impl Into<String>, value: Value) -> Self {
        let mut slices = BTreeMap::clone(&self.slices);
        slices.insert(name.into(), value);
        Self {
            slices: Arc::new(slices),
        }
    }

    /// New snapshot without `name` (the same snapshot if it is absent)
    pub fn without_slice(&self, name: &str) -> Self {
        if !self.contains(name) {
            return self.clone();
        }

        let mut slices = BTreeMap::clone(&self.slices);
        slices.remove(name);
        Self {
            slices: Arc::new(slices),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slices.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Whether both handles point at the very same snapshot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slices, &other.slices)
    }

    /// The whole tree as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.slices
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Rebuild a tree from a JSON object; anything else yields `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self {
                slices: Arc::new(fields.into_iter().collect()),
            }),
            _ => None,
        }
    }

    /// Store-level changes from `self` to `after`, in name order
    pub fn diff(&self, after: &StateTree) -> Vec<SliceChange> {
        if self.ptr_eq(after) {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for (name, before) in self.slices.iter() {
            match after.slices.get(name) {
                None => changes.push(SliceChange::Removed(name.clone())),
                Some(value) if value != before => changes.push(SliceChange::Changed(name.clone())),
                Some(_) => {}
            }
        }
        for name in after.slices.keys() {
            if !self.slices.contains_key(name) {
                changes.push(SliceChange::Added(name.clone()));
            }
        }
        changes.sort_by(|a, b| a.name().cmp(b.name()));
        changes
    }
}

fn index_value<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(fields) => fields.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

impl PartialEq for StateTree {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.slices == other.slices
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slices.iter()).finish()
    }
}

impl fmt::Display for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.to_value()) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Serialize for StateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slices.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StateTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            slices: Arc::new(BTreeMap::deserialize(deserializer)?),
        })
    }
}
