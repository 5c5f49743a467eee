//! Strict mapping store with short-name indexing and ambiguity detection.
//!
//! Qualified keys are dotted identifiers (`namespace.id`). Every insert of a
//! qualified key also indexes the entry under its short name (the segment
//! after the last dot) so callers can look entries up unqualified. When two
//! qualified keys collapse to the same short name, the short-name slot is
//! replaced by a tombstone and unqualified lookups fail until the caller
//! switches to full names.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{RegistryError, RegistryResult};

/// Separator between namespace segments in a qualified key.
const SEPARATOR: char = '.';

/// One slot in the registry.
///
/// Short-name collisions and best-effort migration both need to park
/// something other than a value under a key, so the slot is a tagged variant
/// rather than a bare `V`.
#[derive(Debug, Clone)]
pub enum Slot<V> {
    /// A live entry. Shared between the full-key and short-key slots.
    Value(Arc<V>),
    /// Two or more qualified keys collapse to this short name.
    Ambiguous { subject: String },
    /// Placeholder for an entry that could not be copied during migration.
    Degraded { reason: String },
}

/// A named map enforcing global key uniqueness with a secondary short-name
/// index.
///
/// `insert` takes the reload flag explicitly: the coordinator decides when
/// remove-then-reinsert semantics apply, and nothing outside a reload can
/// silently overwrite an entry.
#[derive(Debug)]
pub struct StrictRegistry<V> {
    name: String,
    entries: HashMap<String, Slot<V>>,
}

impl<V> StrictRegistry<V> {
    /// Create an empty registry. The name appears in every error message.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Insert a value under a qualified key.
    ///
    /// With `reload` set, any existing entry under `key` is removed first so
    /// a re-parse of the same file never trips the duplicate check. Without
    /// it, a duplicate key is an error: silently replacing a mapping is
    /// configuration corruption.
    ///
    /// A dotted key is additionally indexed under its short name; a second
    /// qualified key with the same short name turns the short-name slot into
    /// an ambiguity tombstone (and it stays one no matter how many more
    /// collisions arrive).
    pub fn insert(&mut self, key: impl Into<String>, value: V, reload: bool) -> RegistryResult<()> {
        self.insert_shared(key, Arc::new(value), reload)
    }

    /// `insert` for values that are already shared.
    ///
    /// Used by collection migration, which copies `Arc`ed entries out of a
    /// plain map.
    pub fn insert_shared(
        &mut self,
        key: impl Into<String>,
        value: Arc<V>,
        reload: bool,
    ) -> RegistryResult<()> {
        let key = key.into();

        if reload {
            self.entries.remove(&key);
        }

        if self.entries.contains_key(&key) {
            return Err(RegistryError::DuplicateKey {
                registry: self.name.clone(),
                key,
            });
        }

        if let Some(short) = short_name(&key) {
            if self.entries.contains_key(short) {
                self.entries.insert(
                    short.to_string(),
                    Slot::Ambiguous {
                        subject: short.to_string(),
                    },
                );
            } else {
                self.entries
                    .insert(short.to_string(), Slot::Value(value.clone()));
            }
        }

        self.entries.insert(key, Slot::Value(value));
        Ok(())
    }

    /// Park a migration failure under `key`.
    ///
    /// Lookups of the key report the stored reason instead of pretending the
    /// entry exists.
    pub fn insert_degraded(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        self.entries.insert(
            key.into(),
            Slot::Degraded {
                reason: reason.into(),
            },
        );
    }

    /// Look up a key, failing on absent, ambiguous, or degraded slots.
    pub fn get(&self, key: &str) -> RegistryResult<Arc<V>> {
        match self.entries.get(key) {
            None => Err(RegistryError::NotFound {
                registry: self.name.clone(),
                key: key.to_string(),
            }),
            Some(Slot::Ambiguous { subject }) => Err(RegistryError::Ambiguous {
                registry: self.name.clone(),
                subject: subject.clone(),
            }),
            Some(Slot::Degraded { reason }) => Err(RegistryError::Degraded {
                registry: self.name.clone(),
                key: key.to_string(),
                reason: reason.clone(),
            }),
            Some(Slot::Value(value)) => Ok(value.clone()),
        }
    }

    /// Remove the slot stored under `key`, returning whether one existed.
    ///
    /// Only the given key is touched. A short-name slot pointing at the
    /// removed entry is left as-is: the reload path re-inserts the same
    /// qualified key immediately, which restores or re-tombstones it.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Whether any slot (value, tombstone, or placeholder) exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of slots, short-name entries and tombstones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The segment after the last separator, or `None` for unqualified keys.
fn short_name(key: &str) -> Option<&str> {
    key.rfind(SEPARATOR).map(|idx| &key[idx + 1..])
}
