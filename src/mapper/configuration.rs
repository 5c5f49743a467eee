//! The process-wide mapper configuration shared between reader threads and
//! the watch task.
//!
//! All mutation happens on the single watch task; host request threads read
//! concurrently through the per-collection locks. Readers racing a reload may
//! observe a transient not-found or ambiguous result, or the old value, or
//! the new one. Last writer wins, and readers converge once the reload
//! finishes.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::registry::{Collection, RegistryResult};

use super::types::{
    KeyGenerator, MappedStatement, ParameterMap, QueryCache, ResultMap, SqlFragment,
};

/// The shared configuration store.
///
/// Holds the six mapping collections, the set of definition-file identities
/// that have already been parsed, and the reload-mode flag that permits
/// remove-then-reinsert during a re-parse.
#[derive(Debug, Default)]
pub struct MapperConfiguration {
    statements: RwLock<Collection<MappedStatement>>,
    caches: RwLock<Collection<QueryCache>>,
    result_maps: RwLock<Collection<ResultMap>>,
    parameter_maps: RwLock<Collection<ParameterMap>>,
    key_generators: RwLock<Collection<KeyGenerator>>,
    sql_fragments: RwLock<Collection<SqlFragment>>,

    /// Canonical identities of definition files already parsed. A reload
    /// removes the identity first so the parser does not skip the file.
    loaded_resources: RwLock<HashSet<String>>,

    /// While set, strict inserts silently replace an existing entry for the
    /// same key. Only [`ReloadGuard`] toggles this.
    reload_mode: AtomicBool,
}

impl MapperConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter reload mode. The flag clears when the guard drops, on every
    /// exit path including a failed re-parse.
    pub fn begin_reload(&self) -> ReloadGuard<'_> {
        self.reload_mode.store(true, Ordering::SeqCst);
        ReloadGuard { configuration: self }
    }

    fn reload_mode(&self) -> bool {
        self.reload_mode.load(Ordering::SeqCst)
    }

    // Statements.

    pub fn add_statement(&self, statement: MappedStatement) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.statements
            .write()
            .insert(statement.id.clone(), Arc::new(statement), reload)
    }

    pub fn statement(&self, id: &str) -> RegistryResult<Arc<MappedStatement>> {
        self.statements.read().get("mapped statements", id)
    }

    // Caches.

    pub fn add_cache(&self, cache: QueryCache) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.caches
            .write()
            .insert(cache.id.clone(), Arc::new(cache), reload)
    }

    pub fn cache(&self, id: &str) -> RegistryResult<Arc<QueryCache>> {
        self.caches.read().get("caches", id)
    }

    // Result maps.

    pub fn add_result_map(&self, result_map: ResultMap) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.result_maps
            .write()
            .insert(result_map.id.clone(), Arc::new(result_map), reload)
    }

    pub fn result_map(&self, id: &str) -> RegistryResult<Arc<ResultMap>> {
        self.result_maps.read().get("result maps", id)
    }

    // Parameter maps.

    pub fn add_parameter_map(&self, parameter_map: ParameterMap) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.parameter_maps
            .write()
            .insert(parameter_map.id.clone(), Arc::new(parameter_map), reload)
    }

    pub fn parameter_map(&self, id: &str) -> RegistryResult<Arc<ParameterMap>> {
        self.parameter_maps.read().get("parameter maps", id)
    }

    // Key generators.

    pub fn add_key_generator(&self, key_generator: KeyGenerator) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.key_generators
            .write()
            .insert(key_generator.id.clone(), Arc::new(key_generator), reload)
    }

    pub fn key_generator(&self, id: &str) -> RegistryResult<Arc<KeyGenerator>> {
        self.key_generators.read().get("key generators", id)
    }

    // SQL fragments.

    pub fn add_sql_fragment(&self, fragment: SqlFragment) -> RegistryResult<()> {
        let reload = self.reload_mode();
        self.sql_fragments
            .write()
            .insert(fragment.id.clone(), Arc::new(fragment), reload)
    }

    pub fn sql_fragment(&self, id: &str) -> RegistryResult<Arc<SqlFragment>> {
        self.sql_fragments.read().get("sql fragments", id)
    }

    // Loaded-resource bookkeeping.

    pub fn is_resource_loaded(&self, resource: &str) -> bool {
        self.loaded_resources.read().contains(resource)
    }

    /// Record that a definition file has been parsed. Parser implementations
    /// call this at the end of a successful parse.
    pub fn mark_resource_loaded(&self, resource: impl Into<String>) {
        self.loaded_resources.write().insert(resource.into());
    }

    /// Drop the already-loaded marker so the next parse of `resource` runs.
    pub fn forget_resource(&self, resource: &str) {
        self.loaded_resources.write().remove(resource);
    }

    /// Slot accessors for the upgrade pass. Each returns the lock, not a
    /// guard, so the upgrader controls the write scope.
    pub(crate) fn statements_slot(&self) -> &RwLock<Collection<MappedStatement>> {
        &self.statements
    }

    pub(crate) fn caches_slot(&self) -> &RwLock<Collection<QueryCache>> {
        &self.caches
    }

    pub(crate) fn result_maps_slot(&self) -> &RwLock<Collection<ResultMap>> {
        &self.result_maps
    }

    pub(crate) fn parameter_maps_slot(&self) -> &RwLock<Collection<ParameterMap>> {
        &self.parameter_maps
    }

    pub(crate) fn key_generators_slot(&self) -> &RwLock<Collection<KeyGenerator>> {
        &self.key_generators
    }

    pub(crate) fn sql_fragments_slot(&self) -> &RwLock<Collection<SqlFragment>> {
        &self.sql_fragments
    }
}

/// RAII scope for reload mode.
///
/// Created by [`MapperConfiguration::begin_reload`]; clears the flag on drop.
#[must_use = "reload mode ends when the guard is dropped"]
pub struct ReloadGuard<'a> {
    configuration: &'a MapperConfiguration,
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.configuration.reload_mode.store(false, Ordering::SeqCst);
    }
}
