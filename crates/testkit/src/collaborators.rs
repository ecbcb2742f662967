//! Scripted stand-ins for the host services the simulator depends on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceStack, ResourceType};
use quarrysim_sim::{
    CatalogError, Collaborators, EnvironmentCatalog, ItemCatalog, LootContext, LootEngine,
    LootError, LootLoadListener, MonsterSpawnEntry, ZoneId,
};
use rand::RngCore;

/// Loot engine that fails every call.
#[derive(Default)]
pub struct FailingLootEngine {
    calls: AtomicUsize,
    listeners: AtomicUsize,
}

impl FailingLootEngine {
    /// Number of `generate` calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of listeners that subscribed.
    pub fn listeners(&self) -> usize {
        self.listeners.load(Ordering::Relaxed)
    }
}

impl LootEngine for FailingLootEngine {
    fn generate(
        &self,
        id: &RegistryKey,
        _luck: f32,
        _ctx: &LootContext,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, LootError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(LootError::Unavailable(format!("scripted failure for {id}")))
    }

    fn subscribe(&self, _listener: Arc<dyn LootLoadListener>) {
        self.listeners.fetch_add(1, Ordering::Relaxed);
    }
}

/// Loot engine returning a fixed list of stacks per table id; unknown ids
/// fail with [`LootError::UnknownTable`].
#[derive(Default)]
pub struct FixedLootEngine {
    tables: HashMap<RegistryKey, Vec<ResourceStack>>,
}

impl FixedLootEngine {
    /// Builder: table `id` always yields `stacks`.
    pub fn with_table(mut self, id: RegistryKey, stacks: Vec<ResourceStack>) -> Self {
        self.tables.insert(id, stacks);
        self
    }
}

impl LootEngine for FixedLootEngine {
    fn generate(
        &self,
        id: &RegistryKey,
        _luck: f32,
        _ctx: &LootContext,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, LootError> {
        self.tables
            .get(id)
            .cloned()
            .ok_or_else(|| LootError::UnknownTable(id.clone()))
    }

    fn subscribe(&self, _listener: Arc<dyn LootLoadListener>) {}
}

/// Environment with hand-written zones and spawn lists.
pub struct ScriptedEnvironment {
    zones: Vec<(ZoneId, Vec<MonsterSpawnEntry>)>,
    moon_phase_factor: f32,
    queries: AtomicUsize,
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            moon_phase_factor: 1.0,
            queries: AtomicUsize::new(0),
        }
    }
}

impl ScriptedEnvironment {
    /// Empty environment under a full moon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a zone with `(monster, weight)` spawns.
    pub fn with_zone(mut self, zone: ZoneId, monsters: &[(&str, u32)]) -> Self {
        let spawns = monsters
            .iter()
            .filter_map(|(key, weight)| {
                RegistryKey::parse(key)
                    .ok()
                    .map(|key| MonsterSpawnEntry::new(key, *weight))
            })
            .collect();
        self.zones.push((zone, spawns));
        self
    }

    /// Builder: set the moon phase factor.
    pub fn with_moon_phase_factor(mut self, factor: f32) -> Self {
        self.moon_phase_factor = factor;
        self
    }

    /// How many times `monsters` was called.
    pub fn monster_queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl EnvironmentCatalog for ScriptedEnvironment {
    fn zones(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|(zone, _)| zone.clone()).collect()
    }

    fn monsters(&self, zone: &ZoneId) -> Vec<MonsterSpawnEntry> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.zones
            .iter()
            .find(|(id, _)| id == zone)
            .map(|(_, spawns)| spawns.clone())
            .unwrap_or_default()
    }

    fn moon_phase_factor(&self) -> f32 {
        self.moon_phase_factor
    }
}

/// Item catalog where every block drops a scripted list (or itself).
#[derive(Default)]
pub struct StaticItemCatalog {
    blocks: RwLock<HashMap<ResourceType, Option<Vec<ResourceStack>>>>,
    dictionary: RwLock<Vec<(String, Vec<ResourceType>)>>,
}

impl StaticItemCatalog {
    /// Catalog with no blocks or tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: `block` drops one of itself.
    pub fn with_block(self, block: ResourceType) -> Self {
        self.blocks.write().insert(block, None);
        self
    }

    /// Builder: `block` drops exactly `drops`, ignoring fortune.
    pub fn with_drops(self, block: ResourceType, drops: Vec<ResourceStack>) -> Self {
        self.blocks.write().insert(block, Some(drops));
        self
    }

    /// Builder: attach dictionary `tag` to `resource`.
    pub fn with_tag(self, tag: &str, resource: ResourceType) -> Self {
        {
            let mut dictionary = self.dictionary.write();
            match dictionary.iter_mut().find(|(name, _)| name == tag) {
                Some((_, members)) => members.push(resource),
                None => dictionary.push((tag.to_string(), vec![resource])),
            }
        }
        self
    }
}

impl ItemCatalog for StaticItemCatalog {
    fn natural_drops(
        &self,
        resource: &ResourceType,
        _fortune: u32,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, CatalogError> {
        match self.blocks.read().get(resource) {
            Some(Some(drops)) => Ok(drops.clone()),
            Some(None) => Ok(vec![resource.to_stack(1)]),
            None => Err(CatalogError::UnknownType(resource.clone())),
        }
    }

    fn dictionary_tags(&self, resource: &ResourceType) -> Vec<String> {
        self.dictionary
            .read()
            .iter()
            .filter(|(_, members)| members.contains(resource))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn dictionary_entries(&self) -> Vec<(String, Vec<ResourceType>)> {
        self.dictionary.read().clone()
    }

    fn is_block(&self, resource: &ResourceType) -> bool {
        self.blocks.read().contains_key(resource)
    }
}

/// Bundle scripted collaborators for [`quarrysim_sim::VirtualMiningSimulator::new`].
pub fn scripted_collaborators(
    environment: ScriptedEnvironment,
    items: StaticItemCatalog,
    loot: Arc<dyn LootEngine>,
) -> Collaborators {
    Collaborators {
        environment: Arc::new(environment),
        items: Arc::new(items),
        loot,
    }
}
