use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceStack};
use rand::RngCore;
use tracing::debug;

use super::{LootContext, LootEngine, LootError, LootLoadListener, LootTable};

/// Data-driven loot engine.
///
/// Definitions are registered up front; a table is *loaded* (copied from its
/// definition and handed to every listener) the first time it is used.
/// Listeners see the live copy, so anything they append stays for the rest
/// of the table's loaded lifetime.
#[derive(Default)]
pub struct TableLootEngine {
    definitions: RwLock<BTreeMap<RegistryKey, LootTable>>,
    loaded: RwLock<HashMap<RegistryKey, LootTable>>,
    listeners: RwLock<Vec<Arc<dyn LootLoadListener>>>,
}

impl TableLootEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine preloaded with the built-in chest, entity and quarry tables.
    pub fn with_vanilla_tables() -> Self {
        let engine = Self::new();
        for (id, table) in crate::vanilla::vanilla_loot_tables() {
            engine.define(id, table);
        }
        engine
    }

    /// Register or replace a table definition. An already loaded copy keeps
    /// serving until [`Self::reload_from_source`].
    pub fn define(&self, id: RegistryKey, table: LootTable) {
        self.definitions.write().insert(id, table);
    }

    pub fn is_defined(&self, id: &RegistryKey) -> bool {
        self.definitions.read().contains_key(id)
    }

    pub fn is_loaded(&self, id: &RegistryKey) -> bool {
        self.loaded.read().contains_key(id)
    }

    /// Clone of the loaded table, if it has been loaded.
    pub fn loaded_table(&self, id: &RegistryKey) -> Option<LootTable> {
        self.loaded.read().get(id).cloned()
    }

    /// Re-fire load notifications over every loaded table in place.
    ///
    /// Listeners that append entries will append them again.
    pub fn reload(&self) {
        let listeners = self.listeners.read().clone();
        let mut loaded = self.loaded.write();
        for (id, table) in loaded.iter_mut() {
            for listener in &listeners {
                listener.on_table_loaded(id, table);
            }
        }
        debug!(tables = loaded.len(), "reloaded loot tables in place");
    }

    /// Drop every loaded copy; the next use reloads from the definitions.
    pub fn reload_from_source(&self) {
        self.loaded.write().clear();
    }

    fn ensure_loaded(&self, id: &RegistryKey) -> Result<(), LootError> {
        if self.loaded.read().contains_key(id) {
            return Ok(());
        }

        let mut table = self
            .definitions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| LootError::UnknownTable(id.clone()))?;
        table.validate(id)?;

        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener.on_table_loaded(id, &mut table);
        }

        let mut loaded = self.loaded.write();
        // Another caller may have loaded it meanwhile; first load wins.
        loaded.entry(id.clone()).or_insert(table);
        debug!(table = %id, "loaded loot table");
        Ok(())
    }
}

impl LootEngine for TableLootEngine {
    fn generate(
        &self,
        id: &RegistryKey,
        luck: f32,
        ctx: &LootContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, LootError> {
        self.ensure_loaded(id)?;
        let loaded = self.loaded.read();
        let table = loaded
            .get(id)
            .ok_or_else(|| LootError::UnknownTable(id.clone()))?;
        Ok(table.generate(luck, ctx, rng))
    }

    fn subscribe(&self, listener: Arc<dyn LootLoadListener>) {
        self.listeners.write().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::{LootPool, PoolEntry, UniformRange, MAIN_POOL};
    use quarrysim_core::ResourceType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener(AtomicUsize);

    impl LootLoadListener for CountingListener {
        fn on_table_loaded(&self, _id: &RegistryKey, table: &mut LootTable) {
            self.0.fetch_add(1, Ordering::Relaxed);
            if let Some(pool) = table.pool_mut(MAIN_POOL) {
                pool.add_entry(PoolEntry::item(
                    ResourceType::vanilla("nether_star"),
                    1,
                    UniformRange::exactly(1),
                ));
            }
        }
    }

    fn single_item_table() -> LootTable {
        LootTable::new(vec![LootPool::new(
            MAIN_POOL,
            UniformRange::exactly(1),
            vec![PoolEntry::item(ResourceType::vanilla("coal"), 1, UniformRange::exactly(1))],
        )])
    }

    #[test]
    fn unknown_table_is_an_error() {
        let engine = TableLootEngine::new();
        let mut rng = StdRng::seed_from_u64(1);
        let result = engine.generate(
            &RegistryKey::quarry("missing"),
            0.0,
            &LootContext::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(LootError::UnknownTable(_))));
    }

    #[test]
    fn tables_load_once_and_notify_listeners() {
        let engine = TableLootEngine::new();
        let id = RegistryKey::quarry("t");
        engine.define(id.clone(), single_item_table());
        let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
        engine.subscribe(listener.clone());

        let mut rng = StdRng::seed_from_u64(2);
        assert!(!engine.is_loaded(&id));
        for _ in 0..5 {
            engine
                .generate(&id, 0.0, &LootContext::default(), &mut rng)
                .unwrap();
        }
        assert!(engine.is_loaded(&id));
        assert_eq!(listener.0.load(Ordering::Relaxed), 1);
        assert_eq!(engine.loaded_table(&id).unwrap().pools[0].entries.len(), 2);
    }

    #[test]
    fn in_place_reload_accumulates_listener_edits() {
        let engine = TableLootEngine::new();
        let id = RegistryKey::quarry("t");
        engine.define(id.clone(), single_item_table());
        engine.subscribe(Arc::new(CountingListener(AtomicUsize::new(0))));

        let mut rng = StdRng::seed_from_u64(3);
        engine
            .generate(&id, 0.0, &LootContext::default(), &mut rng)
            .unwrap();
        engine.reload();
        engine.reload();
        assert_eq!(engine.loaded_table(&id).unwrap().pools[0].entries.len(), 4);

        engine.reload_from_source();
        assert!(!engine.is_loaded(&id));
        engine
            .generate(&id, 0.0, &LootContext::default(), &mut rng)
            .unwrap();
        assert_eq!(engine.loaded_table(&id).unwrap().pools[0].entries.len(), 2);
    }

    #[test]
    fn malformed_definition_is_rejected_at_load() {
        let engine = TableLootEngine::new();
        let id = RegistryKey::quarry("bad");
        let mut table = single_item_table();
        table.pools[0].entries[0].count = UniformRange::new(5, 2);
        engine.define(id.clone(), table);

        let mut rng = StdRng::seed_from_u64(4);
        let result = engine.generate(&id, 0.0, &LootContext::default(), &mut rng);
        assert!(matches!(result, Err(LootError::Malformed { .. })));
        assert!(!engine.is_loaded(&id));
    }

    #[test]
    fn vanilla_engine_defines_every_default_catalog_table() {
        let engine = TableLootEngine::with_vanilla_tables();
        for (id, _) in crate::loot::LootTableManager::new().registered_loot_tables() {
            assert!(engine.is_defined(&id), "missing definition for {id}");
        }
    }
}
