//! Store registry: unique lowercased names, registration order preserved.

use crate::store::Store;

/// Normalize a store name for lookup
pub fn store_key(name: &str) -> String {
    name.to_lowercase()
}

/// A registered store
pub struct StoreEntry {
    name: String,
    store: Box<dyn Store>,
}

impl StoreEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn Store {
        self.store.as_mut()
    }
}

/// Registered stores in registration order
#[derive(Default)]
pub struct StoreRegistry {
    entries: Vec<StoreEntry>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = store_key(name);
        self.entries.iter().position(|entry| entry.name == key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Entry for `store`'s name, inserting `store` only if the name is free
    pub fn get_or_insert(&mut self, store: Box<dyn Store>) -> &mut StoreEntry {
        let index = match self.position(store.name()) {
            Some(index) => index,
            None => {
                self.entries.push(StoreEntry {
                    name: store_key(store.name()),
                    store,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Remove the store registered as `name`
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Store>> {
        let index = self.position(name)?;
        Some(self.entries.remove(index).store)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Store> {
        let index = self.position(name)?;
        Some(self.entries[index].store())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Store> {
        let index = self.position(name)?;
        Some(self.entries[index].store_mut())
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StoreEntry> {
        self.entries.iter_mut()
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
