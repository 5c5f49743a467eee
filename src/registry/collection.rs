//! A configuration collection that is either plain or strict.
//!
//! Host processes populate their collections before this crate is armed, so
//! every slot starts out as a plain map with last-writer-wins inserts. The
//! first reload upgrades each slot in place to a [`StrictRegistry`]; from
//! then on duplicate detection, short-name indexing, and reload-mode
//! semantics apply.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{RegistryError, RegistryResult};
use super::strict::StrictRegistry;

/// One mapping slot of the shared configuration.
#[derive(Debug)]
pub enum Collection<V> {
    /// Pre-upgrade state: a plain map, no uniqueness enforcement.
    Plain(HashMap<String, Arc<V>>),
    /// Post-upgrade state.
    Strict(StrictRegistry<V>),
}

impl<V> Collection<V> {
    /// A fresh, plain, empty collection.
    pub fn new() -> Self {
        Collection::Plain(HashMap::new())
    }

    /// Whether the slot has been upgraded.
    pub fn is_strict(&self) -> bool {
        matches!(self, Collection::Strict(_))
    }

    /// Upgrade a plain map to a strict registry in place.
    ///
    /// Every existing entry is copied. A copy that trips the duplicate check
    /// (a plain map can hold both `ns.id` and a bare `id`) is kept as a
    /// degraded placeholder carrying the error text instead of aborting the
    /// migration. Calling this on an already-strict slot does nothing.
    pub fn upgrade(&mut self, name: &str) {
        let Collection::Plain(map) = self else {
            return;
        };

        let mut registry = StrictRegistry::new(name);
        for (key, value) in map.drain() {
            if let Err(err) = registry.insert_shared(key.clone(), value, false) {
                registry.insert_degraded(key, err.to_string());
            }
        }
        *self = Collection::Strict(registry);
    }

    /// Insert an entry, honoring the slot's current semantics.
    ///
    /// Plain slots overwrite silently and ignore `reload`; strict slots apply
    /// the full duplicate/short-name/reload contract.
    pub fn insert(&mut self, key: String, value: Arc<V>, reload: bool) -> RegistryResult<()> {
        match self {
            Collection::Plain(map) => {
                map.insert(key, value);
                Ok(())
            }
            Collection::Strict(registry) => registry.insert_shared(key, value, reload),
        }
    }

    /// Look up an entry by qualified or (post-upgrade) short name.
    pub fn get(&self, name: &str, key: &str) -> RegistryResult<Arc<V>> {
        match self {
            Collection::Plain(map) => map.get(key).cloned().ok_or_else(|| RegistryError::NotFound {
                registry: name.to_string(),
                key: key.to_string(),
            }),
            Collection::Strict(registry) => registry.get(key),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            Collection::Plain(map) => map.contains_key(key),
            Collection::Strict(registry) => registry.contains(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Plain(map) => map.len(),
            Collection::Strict(registry) => registry.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new()
    }
}
