use std::collections::HashMap;

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceStack};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LootContext, LootEngine, LootLoadListener, LootTable, PoolEntry, UniformRange, MAIN_POOL};
use crate::weighted;

/// Extra stack granted independently of table selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDropEntry {
    pub stack: ResourceStack,
    /// Probability in `(0, 1]`.
    pub chance: f32,
}

const DEFAULT_CHEST_TABLES: &[(&str, u32)] = &[
    ("chests/simple_dungeon", 20),
    ("chests/village_blacksmith", 15),
    ("chests/abandoned_mineshaft", 15),
    ("chests/desert_pyramid", 10),
    ("chests/jungle_temple", 10),
    ("chests/igloo_chest", 8),
    ("chests/stronghold_corridor", 5),
    ("chests/stronghold_crossing", 5),
    ("chests/stronghold_library", 5),
    ("chests/woodland_mansion", 3),
    ("chests/end_city_treasure", 2),
    ("chests/nether_bridge", 5),
];

const DEFAULT_QUARRY_TABLES: &[(&str, u32)] = &[
    ("quarry/common", 25),
    ("quarry/rare", 5),
    ("quarry/legendary", 1),
];

/// Weighted catalog of loot tables the quarry draws from, plus injected
/// entries and custom drops.
///
/// Implements [`LootLoadListener`] so it can patch tables as the engine
/// loads them.
pub struct LootTableManager {
    tables: RwLock<Vec<(RegistryKey, u32)>>,
    injections: RwLock<HashMap<RegistryKey, Vec<PoolEntry>>>,
    custom_drops: RwLock<Vec<CustomDropEntry>>,
}

impl Default for LootTableManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LootTableManager {
    /// Catalog seeded with the default chest and quarry tables.
    pub fn new() -> Self {
        let tables = DEFAULT_CHEST_TABLES
            .iter()
            .map(|(path, weight)| (RegistryKey::vanilla(path), *weight))
            .chain(
                DEFAULT_QUARRY_TABLES
                    .iter()
                    .map(|(path, weight)| (RegistryKey::quarry(path), *weight)),
            )
            .collect();
        Self::with_tables(tables)
    }

    /// Empty catalog.
    pub fn empty() -> Self {
        Self::with_tables(Vec::new())
    }

    fn with_tables(tables: Vec<(RegistryKey, u32)>) -> Self {
        Self {
            tables: RwLock::new(tables),
            injections: RwLock::new(HashMap::new()),
            custom_drops: RwLock::new(Vec::new()),
        }
    }

    /// Insert a table, or overwrite its weight in place if already present.
    pub fn register_loot_table(&self, id: RegistryKey, weight: u32) {
        let mut tables = self.tables.write();
        match tables.iter_mut().find(|(key, _)| *key == id) {
            Some(slot) => slot.1 = weight,
            None => tables.push((id, weight)),
        }
    }

    pub fn remove_loot_table(&self, id: &RegistryKey) {
        self.tables.write().retain(|(key, _)| key != id);
    }

    /// Change the weight of a registered table; unknown ids are ignored.
    pub fn set_weight(&self, id: &RegistryKey, weight: u32) {
        if let Some(slot) = self.tables.write().iter_mut().find(|(key, _)| key == id) {
            slot.1 = weight;
        }
    }

    /// Queue `entry` for the `main` pool of `target` whenever it loads.
    pub fn inject_entry(&self, target: RegistryKey, entry: PoolEntry) {
        self.injections.write().entry(target).or_default().push(entry);
    }

    /// Convenience over [`Self::inject_entry`] for a fixed-count item.
    pub fn inject_item_drop(&self, target: RegistryKey, stack: &ResourceStack, weight: u32) {
        let entry = PoolEntry::item(stack.resource_type(), weight, UniformRange::exactly(stack.count));
        self.inject_entry(target, entry);
    }

    pub fn add_custom_drop(&self, stack: ResourceStack, chance: f32) {
        self.custom_drops.write().push(CustomDropEntry { stack, chance });
    }

    pub fn clear_custom_drops(&self) {
        self.custom_drops.write().clear();
    }

    pub fn custom_drops(&self) -> Vec<CustomDropEntry> {
        self.custom_drops.read().clone()
    }

    /// Registered tables with weights, in registration order.
    pub fn registered_loot_tables(&self) -> Vec<(RegistryKey, u32)> {
        self.tables.read().clone()
    }

    /// Weight of `id`, 0 if not registered.
    pub fn loot_table_weight(&self, id: &RegistryKey) -> u32 {
        self.tables
            .read()
            .iter()
            .find(|(key, _)| key == id)
            .map_or(0, |(_, weight)| *weight)
    }

    /// Pending injections for `id`.
    pub fn injections_for(&self, id: &RegistryKey) -> Vec<PoolEntry> {
        self.injections.read().get(id).cloned().unwrap_or_default()
    }

    /// Weighted draw over the catalog; `None` when empty or all weights are 0.
    pub fn select_loot_table(&self, rng: &mut dyn RngCore) -> Option<RegistryKey> {
        let tables = self.tables.read();
        weighted::pick_by(tables.as_slice(), |(_, weight)| *weight, rng).map(|(id, _)| id.clone())
    }

    /// One loot generation: a table draw plus every custom drop that fires.
    pub fn generate_loot(
        &self,
        engine: &dyn LootEngine,
        luck: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<ResourceStack> {
        let mut out = Vec::new();

        if let Some(id) = self.select_loot_table(rng) {
            match engine.generate(&id, luck, &LootContext::default(), rng) {
                Ok(stacks) => out.extend(stacks),
                Err(err) => debug!(table = %id, %err, "loot generation failed; no stacks"),
            }
        }

        for drop in self.custom_drops.read().iter() {
            if rng.gen::<f32>() < drop.chance {
                out.push(drop.stack.clone());
            }
        }
        out
    }
}

impl LootLoadListener for LootTableManager {
    fn on_table_loaded(&self, id: &RegistryKey, table: &mut LootTable) {
        let injections = self.injections.read();
        let Some(entries) = injections.get(id) else {
            return;
        };
        match table.pool_mut(MAIN_POOL) {
            Some(pool) => {
                for entry in entries {
                    pool.add_entry(entry.clone());
                }
                debug!(table = %id, count = entries.len(), "applied loot injections");
            }
            None => debug!(table = %id, "no main pool; injections skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::{LootError, LootPool};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    struct BrokenEngine;

    impl LootEngine for BrokenEngine {
        fn generate(
            &self,
            _id: &RegistryKey,
            _luck: f32,
            _ctx: &LootContext,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<ResourceStack>, LootError> {
            Err(LootError::Unavailable("offline".into()))
        }

        fn subscribe(&self, _listener: Arc<dyn LootLoadListener>) {}
    }

    #[test]
    fn defaults_are_seeded_in_order() {
        let manager = LootTableManager::new();
        let tables = manager.registered_loot_tables();
        assert_eq!(tables.len(), 15);
        assert_eq!(tables[0], (RegistryKey::vanilla("chests/simple_dungeon"), 20));
        assert_eq!(tables[14], (RegistryKey::quarry("quarry/legendary"), 1));
        assert_eq!(manager.loot_table_weight(&RegistryKey::quarry("quarry/common")), 25);
    }

    #[test]
    fn register_overwrites_in_place() {
        let manager = LootTableManager::new();
        let id = RegistryKey::vanilla("chests/simple_dungeon");
        manager.register_loot_table(id.clone(), 99);
        let tables = manager.registered_loot_tables();
        assert_eq!(tables.len(), 15);
        assert_eq!(tables[0], (id, 99));
    }

    #[test]
    fn set_weight_ignores_unknown_tables() {
        let manager = LootTableManager::empty();
        let id = RegistryKey::quarry("ghost");
        manager.set_weight(&id, 10);
        assert_eq!(manager.loot_table_weight(&id), 0);
        assert!(manager.registered_loot_tables().is_empty());
    }

    #[test]
    fn zero_total_weight_selects_nothing() {
        let manager = LootTableManager::empty();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(manager.select_loot_table(&mut rng).is_none());

        manager.register_loot_table(RegistryKey::quarry("a"), 0);
        assert!(manager.select_loot_table(&mut rng).is_none());

        manager.remove_loot_table(&RegistryKey::quarry("a"));
        assert!(manager.registered_loot_tables().is_empty());
    }

    #[test]
    fn custom_drops_fire_even_when_the_engine_fails() {
        let manager = LootTableManager::new();
        manager.add_custom_drop(ResourceStack::vanilla("nether_star", 1), 1.0);
        let mut rng = StdRng::seed_from_u64(2);
        let out = manager.generate_loot(&BrokenEngine, 0.0, &mut rng);
        assert_eq!(out, vec![ResourceStack::vanilla("nether_star", 1)]);

        manager.clear_custom_drops();
        assert!(manager.generate_loot(&BrokenEngine, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn injections_land_in_the_main_pool_only() {
        let manager = LootTableManager::empty();
        let id = RegistryKey::quarry("quarry/common");
        manager.inject_item_drop(id.clone(), &ResourceStack::vanilla("diamond", 2), 7);

        let mut table = LootTable::new(vec![LootPool::new(MAIN_POOL, UniformRange::exactly(1), vec![])]);
        manager.on_table_loaded(&id, &mut table);
        let entry = &table.pools[0].entries[0];
        assert_eq!(entry.weight, 7);
        assert_eq!(entry.count, UniformRange::exactly(2));

        let mut no_main = LootTable::new(vec![LootPool::new("bonus", UniformRange::exactly(1), vec![])]);
        manager.on_table_loaded(&id, &mut no_main);
        assert!(no_main.pools[0].entries.is_empty());

        let mut other = LootTable::new(vec![LootPool::new(MAIN_POOL, UniformRange::exactly(1), vec![])]);
        manager.on_table_loaded(&RegistryKey::quarry("quarry/rare"), &mut other);
        assert!(other.pools[0].entries.is_empty());
    }
}
