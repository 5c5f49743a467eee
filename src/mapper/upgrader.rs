//! One-time upgrade of a configuration's collections to strict registries.

use parking_lot::RwLock;

use crate::registry::Collection;

use super::configuration::MapperConfiguration;

/// Upgrades every collection slot of a [`MapperConfiguration`] to a
/// [`StrictRegistry`](crate::registry::StrictRegistry).
///
/// Must run before the first reload so reload-mode semantics are honored from
/// then on. Idempotent and cheap once every slot is strict, so the reload
/// coordinator calls it on every attempt.
pub struct RegistryUpgrader;

impl RegistryUpgrader {
    pub fn ensure_strict(configuration: &MapperConfiguration) {
        upgrade_slot("mapped statements", configuration.statements_slot());
        upgrade_slot("caches", configuration.caches_slot());
        upgrade_slot("result maps", configuration.result_maps_slot());
        upgrade_slot("parameter maps", configuration.parameter_maps_slot());
        upgrade_slot("key generators", configuration.key_generators_slot());
        upgrade_slot("sql fragments", configuration.sql_fragments_slot());
    }
}

fn upgrade_slot<V>(name: &str, slot: &RwLock<Collection<V>>) {
    // Skip the write lock entirely for already-upgraded slots: after the
    // first reload this is the hot path.
    if slot.read().is_strict() {
        return;
    }

    let mut slot = slot.write();
    if !slot.is_strict() {
        crate::debug_event!("upgrade", "converting collection", "{name}");
        slot.upgrade(name);
    }
}
