//! The dispatcher
//!
//! `Flux` owns the store registry, the current state tree, the event bus and
//! the persistence collaborator. One instance is created at startup and
//! passed to whoever needs to read state or dispatch actions.

use flux_storage::PersistedStore;
use serde_json::{Map, Value};

use crate::action::{Action, Payload};
use crate::debug::{DebugReport, DebugSink, LogSink};
use crate::event_bus::{EventBus, ListenerId};
use crate::options::FluxOptions;
use crate::registry::{store_key, StoreRegistry};
use crate::state_path::StatePath;
use crate::state_tree::StateTree;
use crate::store::Store;

fn empty_slice() -> Value {
    Value::Object(Map::new())
}

/// `null`, `false`, zero and the empty string
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Treat a falsy value like a missing one
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !is_falsy(value))
}

/// Flux - holds the state tree and runs every action through every store
pub struct Flux {
    registry: StoreRegistry,
    state: StateTree,
    events: EventBus,
    storage: PersistedStore,
    options: FluxOptions,
    debug_sink: Box<dyn DebugSink>,
}

impl Flux {
    /// Create a dispatcher with in-memory storage
    pub fn new(options: FluxOptions) -> Self {
        Self::with_storage(options, PersistedStore::in_memory())
    }

    /// Create a dispatcher persisting through `storage`
    ///
    /// With caching on, the tree cached under the cache key is loaded up front
    /// so slices of stores that have not registered yet survive cache writes.
    pub fn with_storage(options: FluxOptions, storage: PersistedStore) -> Self {
        log::debug!(
            "Creating flux (debug: {}, cache: {}, key: {})",
            options.debug,
            options.cache,
            options.cache_key
        );

        let state = if options.cache {
            storage
                .get_session_data(&options.cache_key)
                .and_then(StateTree::from_value)
                .unwrap_or_default()
        } else {
            StateTree::new()
        };
        log::trace!("Preloaded {} cached slice(s)", state.len());

        Self {
            registry: StoreRegistry::new(),
            state,
            events: EventBus::new(),
            storage,
            options,
            debug_sink: Box::new(LogSink),
        }
    }

    /// Replace where debug reports go (the `log` facade by default)
    pub fn set_debug_sink(&mut self, sink: impl DebugSink + 'static) {
        self.debug_sink = Box::new(sink);
    }

    pub fn options(&self) -> &FluxOptions {
        &self.options
    }

    pub fn storage(&self) -> &PersistedStore {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut PersistedStore {
        &mut self.storage
    }

    /// Turn debug reports on for all following dispatches
    pub fn enable_debugger(&mut self) {
        self.options.debug = true;
    }

    pub fn is_debug(&self) -> bool {
        self.options.debug
    }

    /// Dispatch one action, or each element of a JSON array of actions
    ///
    /// Values that are not well-formed actions are skipped silently.
    pub fn dispatch(&mut self, action: impl Into<Value>) {
        match action.into() {
            Value::Array(actions) => self.dispatch_all(actions),
            raw => match Action::parse(raw) {
                Ok(action) => self.dispatch_action(action),
                Err(e) => log::trace!("Skipping malformed action: {}", e),
            },
        }
    }

    /// Dispatch actions one after another
    ///
    /// Each element must be an action itself; nested arrays are skipped.
    pub fn dispatch_all<I>(&mut self, actions: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for action in actions {
            match Action::parse(action.into()) {
                Ok(action) => self.dispatch_action(action),
                Err(e) => log::trace!("Skipping malformed action: {}", e),
            }
        }
    }

    fn dispatch_action(&mut self, action: Action) {
        let before = self.state.clone();
        let action_value = self.options.debug.then(|| action.to_value());
        let (action_type, payload) = action.into_parts();

        log::debug!("Action: {}", action_type);

        // Every store settles before the event fires
        for entry in self.registry.iter_mut() {
            let name = entry.name().to_string();
            let prior = present(self.state.get(&name).cloned())
                .or_else(|| present(entry.store().initial_state()))
                .unwrap_or_else(empty_slice);

            let next = match entry.store().on_action(&action_type, &payload, &prior) {
                Ok(next) => present(next).unwrap_or(prior),
                Err(e) => {
                    log::error!("Store '{}' failed on {}: {:#}", name, action_type, e);
                    prior
                }
            };

            self.state = self.state.with_slice(name, next.clone());

            if self.options.cache {
                write_cache(&mut self.storage, &self.options.cache_key, &self.state);
            }

            entry.store_mut().set_state(&next);
        }

        if let Some(action_value) = action_value {
            let report = DebugReport::new(&action_type, action_value, before, self.state.clone());
            self.debug_sink.report(&report);
        }

        let notified = self.events.emit(&action_type, &payload);
        log::trace!("Emitted {} to {} listener(s)", action_type, notified);
    }

    /// Current state tree snapshot
    pub fn state(&self) -> &StateTree {
        &self.state
    }

    /// Read the tree, a slice, or a nested value inside a slice
    ///
    /// Returns `default` when any segment of the path is missing.
    pub fn get_state<'p>(&self, path: impl Into<StatePath<'p>>, default: Value) -> Value {
        match path.into() {
            StatePath::Root => self.state.to_value(),
            StatePath::Keys(keys) if keys.is_empty() => self.state.to_value(),
            StatePath::Key(key) => self.state.get(key).cloned().unwrap_or(default),
            StatePath::Keys(keys) => self.state.get_in(keys.as_slice()).cloned().unwrap_or(default),
        }
    }

    /// Register `store` under its lowercased name
    ///
    /// If the name is already registered `store` is dropped and the existing
    /// store is returned with its state untouched.
    pub fn register_store<S: Store + 'static>(&mut self, store: S) -> &dyn Store {
        self.register_boxed(Box::new(store))
    }

    /// [`register_store`](Self::register_store) for an already boxed store
    pub fn register_boxed(&mut self, store: Box<dyn Store>) -> &dyn Store {
        let name = store_key(store.name());

        if self.registry.contains(&name) {
            log::trace!("Store '{}' already registered", name);
        } else {
            let seed = present(self.state.get(&name).cloned())
                .or_else(|| present(self.cached_slice(&name)))
                .or_else(|| present(store.initial_state()))
                .unwrap_or_else(empty_slice);
            self.state = self.state.with_slice(name.clone(), seed);

            if self.options.cache {
                write_cache(&mut self.storage, &self.options.cache_key, &self.state);
            }

            log::debug!("Registered store '{}'", name);
        }

        self.registry.get_or_insert(store).store()
    }

    /// Remove a store and its slice; unknown names are ignored
    pub fn deregister_store(&mut self, name: &str) {
        let name = store_key(name);
        let removed = self.registry.remove(&name).is_some();
        let had_slice = self.state.contains(&name);

        self.state = self.state.without_slice(&name);

        if had_slice && self.options.cache {
            write_cache(&mut self.storage, &self.options.cache_key, &self.state);
        }

        if removed {
            log::debug!("Deregistered store '{}'", name);
        }
    }

    /// The store registered as `name` (case-insensitive)
    pub fn get_class(&self, name: &str) -> Option<&dyn Store> {
        self.registry.get(name)
    }

    pub fn get_class_mut(&mut self, name: &str) -> Option<&mut dyn Store> {
        self.registry.get_mut(name)
    }

    /// Registered store names in registration order
    pub fn store_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Listen for actions of type `event`
    pub fn on<F>(&mut self, event: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Payload) + Send + 'static,
    {
        self.events.on(event, listener)
    }

    /// Listen for the next action of type `event` only
    pub fn once<F>(&mut self, event: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Payload) + Send + 'static,
    {
        self.events.once(event, listener)
    }

    /// Stop a listener; returns whether it was subscribed
    pub fn off(&mut self, event: &str, id: ListenerId) -> bool {
        self.events.off(event, id)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.events.listener_count(event)
    }

    /// Slice for `name` from the session cache, when caching is on
    fn cached_slice(&self, name: &str) -> Option<Value> {
        if !self.options.cache {
            return None;
        }

        match self.storage.get_session_data(&self.options.cache_key)? {
            Value::Object(mut cache) => cache.remove(name),
            _ => None,
        }
    }
}

fn write_cache(storage: &mut PersistedStore, cache_key: &str, state: &StateTree) {
    storage.set_session_data(cache_key, &state.to_value());
}

impl Default for Flux {
    fn default() -> Self {
        Self::new(FluxOptions::default())
    }
}

impl std::fmt::Debug for Flux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flux")
            .field("stores", &self.registry)
            .field("state", &self.state)
            .field("events", &self.events)
            .field("storage", &self.storage)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Appends `item` on ADD_ITEM, records every `set_state`
    #[derive(Default)]
    struct Cart {
        log: Log,
    }

    impl Store for Cart {
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
            match action_type {
                "ADD_ITEM" => {
                    let mut items = state.as_array().cloned().unwrap_or_default();
                    items.push(payload.get("item").cloned().unwrap_or(Value::Null));
                    Ok(Some(Value::Array(items)))
                }
                "CLEAR" => Ok(Some(json!([]))),
                _ => Ok(None),
            }
        }

        fn set_state(&mut self, state: &Value) {
            self.log.lock().unwrap().push(format!("set_state {}", state));
        }
    }

    /// Nested state for path reads
    struct Profile;

    impl Store for Profile {
        fn name(&self) -> &str {
            "profile"
        }

        fn initial_state(&self) -> Option<Value> {
            Some(json!({"user": {"name": "ada", "tags": ["admin"]}}))
        }

        fn on_action(
            &self,
            action_type: &str,
            payload: &Payload,
            state: &Value,
        ) -> anyhow::Result<Option<Value>> {
            if action_type != "RENAME" {
                return Ok(None);
            }
            let mut next = state.clone();
            next["user"]["name"] = payload.get("name").cloned().unwrap_or(Value::Null);
            Ok(Some(next))
        }
    }

    /// Fails on BOOM, otherwise counts actions
    struct Fragile;

    impl Store for Fragile {
        fn name(&self) -> &str {
            "fragile"
        }

        fn on_action(
            &self,
            action_type: &str,
            _: &Payload,
            state: &Value,
        ) -> anyhow::Result<Option<Value>> {
            if action_type == "BOOM" {
                anyhow::bail!("cannot handle {}", action_type);
            }
            let seen = state.get("seen").and_then(Value::as_u64).unwrap_or(0);
            Ok(Some(json!({"seen": seen + 1})))
        }
    }

    /// Named store that takes its slice from the payload field of its name
    struct Slot(&'static str);

    impl Store for Slot {
        fn name(&self) -> &str {
            self.0
        }

        fn initial_state(&self) -> Option<Value> {
            Some(json!(format!("{}-init", self.0)))
        }

        fn on_action(
            &self,
            action_type: &str,
            payload: &Payload,
            _: &Value,
        ) -> anyhow::Result<Option<Value>> {
            match action_type {
                "SET" => Ok(payload.get(self.0).cloned()),
                _ => Ok(None),
            }
        }
    }

    /// Session backend counting writes
    #[derive(Clone, Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: Arc<Mutex<usize>>,
    }

    impl StorageBackend for CountingStorage {
        fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
            *self.writes.lock().unwrap() += 1;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }

        fn clear(&mut self) -> Result<(), StorageError> {
            self.inner.clear()
        }
    }

    fn storage_with_session(session: impl StorageBackend + 'static) -> PersistedStore {
        PersistedStore::new(Box::new(session), Box::new(MemoryStorage::new()))
    }

    fn add_item(item: &str) -> Value {
        json!({"type": "ADD_ITEM", "item": item})
    }

    #[test]
    fn test_cart_scenario() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());

        flux.dispatch(add_item("apple"));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));

        flux.dispatch(add_item("banana"));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple", "banana"]));
    }

    #[test]
    fn test_typed_action_dispatch() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());

        flux.dispatch(Action::new("ADD_ITEM").with("item", "pear"));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["pear"]));
    }

    #[test]
    fn test_malformed_actions_are_skipped() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());
        let fired = Arc::new(Mutex::new(0));
        for event in ["ADD_ITEM", "5", "null"] {
            let fired = Arc::clone(&fired);
            flux.on(event, move |_| *fired.lock().unwrap() += 1);
        }
        let before = flux.state().clone();

        flux.dispatch(json!({"item": "apple"}));
        flux.dispatch(json!({"type": 5, "item": "apple"}));
        flux.dispatch(json!({"type": null}));
        flux.dispatch(json!("ADD_ITEM"));
        flux.dispatch(Value::Null);

        assert!(flux.state().ptr_eq(&before));
        assert_eq!(*fired.lock().unwrap(), 0);
    }

    #[test]
    fn test_batch_dispatch() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());

        flux.dispatch(json!([add_item("a"), {"type": 1}, add_item("b")]));
        flux.dispatch_all(vec![add_item("c"), add_item("d")]);

        assert_eq!(flux.get_state("cart", Value::Null), json!(["a", "b", "c", "d"]));
    }

    #[test]
    fn test_nested_action_arrays_are_skipped() {
        let mut flux = Flux::default();
        flux.register_store(Slot("a"));
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        flux.on("SET", move |_| *counter.lock().unwrap() += 1);

        flux.dispatch(json!([[{"type": "SET", "a": "nested"}]]));
        assert_eq!(flux.get_state("a", Value::Null), json!("a-init"));
        assert_eq!(*fired.lock().unwrap(), 0);

        flux.dispatch_all(vec![
            json!([{"type": "SET", "a": "nested"}]),
            json!({"type": "SET", "a": "flat"}),
        ]);
        assert_eq!(flux.get_state("a", Value::Null), json!("flat"));
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[test]
    fn test_unhandled_action_keeps_prior_slice() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());
        flux.dispatch(add_item("apple"));

        flux.dispatch(json!({"type": "UNKNOWN"}));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
    }

    #[test]
    fn test_register_store_is_idempotent() {
        let mut flux = Flux::default();
        let first = std::ptr::from_ref(flux.register_store(Cart::default())).cast::<()>();
        flux.dispatch(add_item("apple"));

        let second = std::ptr::from_ref(flux.register_store(Cart::default())).cast::<()>();

        assert_eq!(first, second);
        assert_eq!(flux.store_names().collect::<Vec<_>>(), vec!["cart"]);
        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
    }

    #[test]
    fn test_register_seeds_empty_object_without_initial_state() {
        let mut flux = Flux::default();
        flux.register_store(Fragile);
        assert_eq!(flux.get_state("fragile", Value::Null), json!({}));
    }

    #[test]
    fn test_deregister_store() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());
        flux.register_store(Profile);

        flux.deregister_store("CART");
        flux.deregister_store("missing");

        assert!(flux.get_class("cart").is_none());
        assert_eq!(flux.get_state("cart", json!("default")), json!("default"));
        assert!(flux.get_class("Profile").is_some());
    }

    #[test]
    fn test_get_class_is_case_insensitive() {
        let mut flux = Flux::default();
        flux.register_store(Cart::default());

        assert_eq!(flux.get_class("CART").map(|store| store.name()), Some("Cart"));
        assert!(flux.get_class_mut("cart").is_some());
        assert!(flux.get_class("basket").is_none());
    }

    #[test]
    fn test_get_state_paths() {
        let mut flux = Flux::default();
        flux.register_store(Profile);

        assert_eq!(flux.get_state(["profile", "user", "name"], Value::Null), json!("ada"));
        assert_eq!(flux.get_state(["profile", "user", "tags", "0"], Value::Null), json!("admin"));
        assert_eq!(flux.get_state(["profile", "user", "age"], json!(-1)), json!(-1));
        assert_eq!(flux.get_state(["nobody", "user"], json!(-1)), json!(-1));
        assert_eq!(
            flux.get_state(StatePath::Root, Value::Null),
            json!({"profile": {"user": {"name": "ada", "tags": ["admin"]}}})
        );
        assert_eq!(flux.get_state("", Value::Null), flux.state().to_value());
    }

    #[test]
    fn test_reducer_sees_payload_without_type() {
        let mut flux = Flux::default();
        flux.register_store(Profile);

        flux.dispatch(json!({"type": "RENAME", "name": "grace"}));
        assert_eq!(flux.get_state(["profile", "user", "name"], Value::Null), json!("grace"));
    }

    #[test]
    fn test_reducer_error_is_isolated() {
        let mut flux = Flux::default();
        flux.register_store(Fragile);
        flux.register_store(Cart::default());
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        flux.on("BOOM", move |_| *counter.lock().unwrap() += 1);

        flux.dispatch(json!({"type": "PING"}));
        flux.dispatch(json!({"type": "BOOM"}));
        flux.dispatch(add_item("apple"));

        assert_eq!(flux.get_state("fragile", Value::Null), json!({"seen": 2}));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[test]
    fn test_set_state_runs_before_event() {
        let log: Log = Arc::default();
        let mut flux = Flux::default();
        flux.register_store(Cart { log: Arc::clone(&log) });

        let events = Arc::clone(&log);
        flux.on("ADD_ITEM", move |payload| {
            events.lock().unwrap().push(format!("event {}", Value::Object(payload.clone())));
        });
        flux.dispatch(add_item("apple"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "set_state [\"apple\"]".to_string(),
                "event {\"item\":\"apple\"}".to_string(),
            ]
        );
    }

    #[test]
    fn test_once_and_off() {
        let mut flux = Flux::default();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let once = Arc::clone(&fired);
        flux.once("ADD_ITEM", move |_| once.lock().unwrap().push("once"));
        let always = Arc::clone(&fired);
        let id = flux.on("ADD_ITEM", move |_| always.lock().unwrap().push("on"));
        assert_eq!(flux.listener_count("ADD_ITEM"), 2);

        flux.dispatch(add_item("a"));
        assert!(flux.off("ADD_ITEM", id));
        flux.dispatch(add_item("b"));

        assert_eq!(*fired.lock().unwrap(), vec!["once", "on"]);
        assert_eq!(flux.listener_count("ADD_ITEM"), 0);
    }

    #[test]
    fn test_cache_restores_after_restart() {
        let session = MemoryStorage::new();

        let mut flux =
            Flux::with_storage(FluxOptions::default(), storage_with_session(session.clone()));
        flux.register_store(Cart::default());
        flux.dispatch(add_item("apple"));
        drop(flux);

        assert_eq!(
            session.get("nlFlux").unwrap(),
            Some(json!({"cart": ["apple"]}))
        );

        let mut restarted =
            Flux::with_storage(FluxOptions::default(), storage_with_session(session));
        assert_eq!(restarted.state().names().collect::<Vec<_>>(), vec!["cart"]);
        assert!(restarted.get_class("cart").is_none());
        restarted.register_store(Cart::default());

        assert_eq!(restarted.get_state("cart", Value::Null), json!(["apple"]));
    }

    #[test]
    fn test_restart_keeps_slices_of_stores_not_yet_registered() {
        let session = MemoryStorage::new();
        let mut flux =
            Flux::with_storage(FluxOptions::default(), storage_with_session(session.clone()));
        flux.register_store(Slot("a"));
        flux.register_store(Slot("b"));
        flux.dispatch(json!({"type": "SET", "a": "a-cached", "b": "b-cached"}));
        drop(flux);

        let mut restarted =
            Flux::with_storage(FluxOptions::default(), storage_with_session(session.clone()));
        restarted.register_store(Slot("a"));
        assert_eq!(
            session.get("nlFlux").unwrap(),
            Some(json!({"a": "a-cached", "b": "b-cached"}))
        );

        restarted.register_store(Slot("b"));
        assert_eq!(restarted.get_state("a", Value::Null), json!("a-cached"));
        assert_eq!(restarted.get_state("b", Value::Null), json!("b-cached"));
    }

    #[test]
    fn test_falsy_reducer_result_keeps_prior_slice() {
        let mut flux = Flux::default();
        flux.register_store(Slot("a"));
        flux.dispatch(json!({"type": "SET", "a": {"x": 1}}));

        for falsy in [json!(false), json!(0), json!(0.0), json!(""), Value::Null] {
            flux.dispatch(json!({"type": "SET", "a": falsy}));
            assert_eq!(flux.get_state("a", Value::Null), json!({"x": 1}));
        }

        flux.dispatch(json!({"type": "SET", "a": []}));
        assert_eq!(flux.get_state("a", Value::Null), json!([]));
        flux.dispatch(json!({"type": "SET", "a": true}));
        assert_eq!(flux.get_state("a", Value::Null), json!(true));
    }

    #[test]
    fn test_falsy_cached_slice_falls_back_to_initial_state() {
        let session = MemoryStorage::new();
        let mut seeded = session.clone();
        seeded.set("nlFlux", &json!({"a": false, "b": ""})).unwrap();
        let mut flux = Flux::with_storage(FluxOptions::default(), storage_with_session(session));

        flux.register_store(Slot("a"));
        flux.register_store(Slot("b"));

        assert_eq!(flux.get_state("a", Value::Null), json!("a-init"));
        assert_eq!(flux.get_state("b", Value::Null), json!("b-init"));
    }

    #[test]
    fn test_file_storage_survives_restart() {
        let root = tempfile::tempdir().unwrap();
        let open = || {
            PersistedStore::new(
                Box::new(FileStorage::session(Some(root.path())).unwrap()),
                Box::new(FileStorage::local(Some(root.path())).unwrap()),
            )
        };

        let mut flux = Flux::with_storage(FluxOptions::default(), open());
        flux.register_store(Cart::default());
        flux.dispatch(add_item("apple"));
        flux.dispatch(add_item("banana"));
        drop(flux);

        let mut restarted = Flux::with_storage(FluxOptions::default(), open());
        restarted.register_store(Cart::default());
        assert_eq!(restarted.get_state("cart", Value::Null), json!(["apple", "banana"]));
    }

    #[test]
    fn test_corrupt_cache_file_starts_from_initial_state() {
        let root = tempfile::tempdir().unwrap();
        let session = FileStorage::session(Some(root.path())).unwrap();
        std::fs::write(session.item_path("nlFlux"), "{\"meta\": {").unwrap();
        let storage = PersistedStore::new(
            Box::new(session),
            Box::new(FileStorage::local(Some(root.path())).unwrap()),
        );

        let mut flux = Flux::with_storage(FluxOptions::default(), storage);
        assert!(flux.state().is_empty());
        flux.register_store(Cart::default());

        assert_eq!(flux.get_state("cart", Value::Null), json!([]));
        assert_eq!(flux.storage().get_session_data("nlFlux"), Some(json!({"cart": []})));
    }

    #[test]
    fn test_cache_disabled_ignores_storage() {
        let session = MemoryStorage::new();
        let mut seeded = session.clone();
        seeded.set("nlFlux", &json!({"cart": ["stale"]})).unwrap();

        let options = FluxOptions::default().with_cache(false);
        let mut flux = Flux::with_storage(options, storage_with_session(session.clone()));
        flux.register_store(Cart::default());
        flux.dispatch(add_item("apple"));

        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
        assert_eq!(session.get("nlFlux").unwrap(), Some(json!({"cart": ["stale"]})));
    }

    #[test]
    fn test_custom_cache_key() {
        let session = MemoryStorage::new();
        let options = FluxOptions::default().with_cache_key("appState");
        let mut flux = Flux::with_storage(options, storage_with_session(session.clone()));
        flux.register_store(Cart::default());

        assert_eq!(session.get("appState").unwrap(), Some(json!({"cart": []})));
        assert_eq!(session.get("nlFlux").unwrap(), None);
    }

    #[test]
    fn test_cache_written_per_store_update() {
        let session = CountingStorage::default();
        let writes = Arc::clone(&session.writes);
        let mut flux = Flux::with_storage(FluxOptions::default(), storage_with_session(session));

        flux.register_store(Cart::default());
        flux.register_store(Profile);
        assert_eq!(*writes.lock().unwrap(), 2);

        flux.dispatch(add_item("apple"));
        assert_eq!(*writes.lock().unwrap(), 4);
    }

    #[test]
    fn test_unavailable_storage_keeps_state_in_memory() {
        let mut flux = Flux::with_storage(FluxOptions::default(), PersistedStore::unavailable());
        flux.register_store(Cart::default());
        flux.dispatch(add_item("apple"));

        assert_eq!(flux.get_state("cart", Value::Null), json!(["apple"]));
    }

    #[test]
    fn test_register_seeds_from_cache() {
        let session = MemoryStorage::new();
        let mut seeded = session.clone();
        seeded.set("nlFlux", &json!({"cart": ["cached"]})).unwrap();
        let mut flux = Flux::with_storage(FluxOptions::default(), storage_with_session(session));

        flux.register_store(Cart::default());
        flux.dispatch(add_item("fresh"));
        assert_eq!(flux.get_state("cart", Value::Null), json!(["cached", "fresh"]));
    }

    #[test]
    fn test_debug_reports() {
        let reports: Arc<Mutex<Vec<(String, bool)>>> = Arc::default();
        let sink = Arc::clone(&reports);
        let mut flux = Flux::default();
        flux.set_debug_sink(move |report: &DebugReport| {
            sink.lock().unwrap().push((report.action_type.clone(), report.has_changed()));
        });
        flux.register_store(Cart::default());

        flux.dispatch(add_item("ignored"));
        assert!(reports.lock().unwrap().is_empty());

        flux.enable_debugger();
        assert!(flux.is_debug());
        flux.dispatch(add_item("apple"));
        flux.dispatch(json!({"type": "NOOP"}));

        assert_eq!(
            *reports.lock().unwrap(),
            vec![("ADD_ITEM".to_string(), true), ("NOOP".to_string(), false)]
        );
    }

    #[test]
    fn test_store_names_in_registration_order() {
        let mut flux = Flux::default();
        flux.register_store(Fragile);
        flux.register_store(Cart::default());
        flux.register_store(Profile);

        assert_eq!(flux.store_names().collect::<Vec<_>>(), vec!["fragile", "cart", "profile"]);
    }
}
