//! The simulation facade: dispatches a quarry operation by mode and keeps
//! running statistics.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use quarrysim_core::{Catalyst, ModifierType, ResourceStack, ResourceType, StackKey, DEFAULT_NAMESPACE};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog::{EnvironmentCatalog, ItemCatalog};
use crate::config::SimulationConfig;
use crate::loot::{LootEngine, LootTableManager};
use crate::mob_drops::MonsterDropSimulator;
use crate::ore::OreRegistry;
use crate::zone::ZoneId;

/// Share of virtual blocks that are plain filler.
pub const FILLER_CHANCE: f32 = 0.85;
/// Chance a silk-touched filler block yields one stone.
pub const SILK_TOUCH_STONE_CHANCE: f32 = 0.1;

/// Vanilla ores whose yield fortune increases.
const FORTUNE_ORES: &[&str] = &[
    "coal_ore",
    "diamond_ore",
    "emerald_ore",
    "lapis_ore",
    "redstone_ore",
    "lit_redstone_ore",
    "quartz_ore",
];

/// What a quarry operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    Mining,
    MobDrops,
    LootTable,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 3] = [
        SimulationMode::Mining,
        SimulationMode::MobDrops,
        SimulationMode::LootTable,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SimulationMode::Mining => "mining",
            SimulationMode::MobDrops => "mob_drops",
            SimulationMode::LootTable => "loot_table",
        }
    }

    /// Parse a mode name (case-insensitive, `-` and `_` interchangeable).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace('-', "_").as_str() {
            "mining" | "mine" => Some(SimulationMode::Mining),
            "mob_drops" | "mobs" => Some(SimulationMode::MobDrops),
            "loot_table" | "loot" => Some(SimulationMode::LootTable),
            _ => None,
        }
    }

    /// Next mode in cycle order (machine UI button).
    pub fn next(self) -> Self {
        match self {
            SimulationMode::Mining => SimulationMode::MobDrops,
            SimulationMode::MobDrops => SimulationMode::LootTable,
            SimulationMode::LootTable => SimulationMode::Mining,
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic counters; only [`VirtualMiningSimulator::reset_statistics`]
/// brings them back to zero.
#[derive(Debug, Default)]
pub struct SimulationStatistics {
    blocks_mined: AtomicU64,
    monsters_killed: AtomicU64,
    loot_generations: AtomicU64,
}

impl SimulationStatistics {
    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    pub fn monsters_killed(&self) -> u64 {
        self.monsters_killed.load(Ordering::Relaxed)
    }

    pub fn loot_generations(&self) -> u64 {
        self.loot_generations.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            blocks_mined: self.blocks_mined(),
            monsters_killed: self.monsters_killed(),
            loot_generations: self.loot_generations(),
        }
    }

    fn reset(&self) {
        self.blocks_mined.store(0, Ordering::Relaxed);
        self.monsters_killed.store(0, Ordering::Relaxed);
        self.loot_generations.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`SimulationStatistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub blocks_mined: u64,
    pub monsters_killed: u64,
    pub loot_generations: u64,
}

/// The host services a simulator reads from.
#[derive(Clone)]
pub struct Collaborators {
    pub environment: Arc<dyn EnvironmentCatalog>,
    pub items: Arc<dyn ItemCatalog>,
    pub loot: Arc<dyn LootEngine>,
}

/// Modifier levels pulled out of a catalyst once per operation.
#[derive(Debug, Clone, Copy, Default)]
struct ModifierLevels {
    fortune: u32,
    silk_touch: bool,
    looting: u32,
    luck: f32,
}

impl ModifierLevels {
    fn from_catalyst(catalyst: &Catalyst) -> Self {
        Self {
            fortune: catalyst.level(ModifierType::Fortune),
            silk_touch: catalyst.level(ModifierType::SilkTouch) > 0,
            looting: catalyst.level(ModifierType::Looting),
            luck: catalyst.level(ModifierType::Luck) as f32,
        }
    }
}

/// Everything a quarry needs to simulate output: registries seeded at
/// construction, the host collaborators and running statistics.
///
/// Shared by reference (or `Arc`) between quarries; every method takes
/// `&self`.
pub struct VirtualMiningSimulator {
    config: SimulationConfig,
    environment: Arc<dyn EnvironmentCatalog>,
    items: Arc<dyn ItemCatalog>,
    loot: Arc<dyn LootEngine>,
    ores: OreRegistry,
    mob_drops: MonsterDropSimulator,
    loot_tables: Arc<LootTableManager>,
    stats: SimulationStatistics,
}

/// The simulator doubles as the shared simulation context.
pub type SimulationContext = VirtualMiningSimulator;

impl VirtualMiningSimulator {
    /// Build and seed every registry. The loot manager is subscribed to the
    /// loot engine so its injections apply whenever a table loads.
    pub fn new(config: SimulationConfig, collaborators: Collaborators) -> Self {
        let ores = OreRegistry::new(
            collaborators.environment.as_ref(),
            collaborators.items.as_ref(),
        );
        Self::with_ores(config, collaborators, ores)
    }

    /// Like [`Self::new`] but with a caller-built ore registry.
    pub fn with_ores(config: SimulationConfig, collaborators: Collaborators, ores: OreRegistry) -> Self {
        let Collaborators {
            environment,
            items,
            loot,
        } = collaborators;

        let loot_tables = Arc::new(LootTableManager::new());
        loot.subscribe(loot_tables.clone());

        Self {
            config,
            environment,
            items,
            loot,
            ores,
            mob_drops: MonsterDropSimulator::new(),
            loot_tables,
            stats: SimulationStatistics::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ore_registry(&self) -> &OreRegistry {
        &self.ores
    }

    pub fn mob_drops(&self) -> &MonsterDropSimulator {
        &self.mob_drops
    }

    pub fn loot_tables(&self) -> &LootTableManager {
        &self.loot_tables
    }

    pub fn environment(&self) -> &dyn EnvironmentCatalog {
        self.environment.as_ref()
    }

    pub fn items(&self) -> &dyn ItemCatalog {
        self.items.as_ref()
    }

    pub fn loot_engine(&self) -> &dyn LootEngine {
        self.loot.as_ref()
    }

    pub fn statistics(&self) -> &SimulationStatistics {
        &self.stats
    }

    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// One quarry operation in `mode` for `zone`.
    pub fn simulate(
        &self,
        mode: SimulationMode,
        zone: &ZoneId,
        catalyst: &Catalyst,
        rng: &mut dyn RngCore,
    ) -> Vec<ResourceStack> {
        let levels = ModifierLevels::from_catalyst(catalyst);
        match mode {
            SimulationMode::Mining => self.simulate_mining(zone, levels, rng),
            SimulationMode::MobDrops => {
                let drops = self.mob_drops.simulate_kill(
                    self.environment.as_ref(),
                    self.loot.as_ref(),
                    zone,
                    levels.looting,
                    rng,
                );
                self.stats.monsters_killed.fetch_add(1, Ordering::Relaxed);
                drops
            }
            SimulationMode::LootTable => {
                let drops = self
                    .loot_tables
                    .generate_loot(self.loot.as_ref(), levels.luck, rng);
                self.stats.loot_generations.fetch_add(1, Ordering::Relaxed);
                drops
            }
        }
    }

    fn simulate_mining(
        &self,
        zone: &ZoneId,
        levels: ModifierLevels,
        rng: &mut dyn RngCore,
    ) -> Vec<ResourceStack> {
        let blocks = self.config.blocks_per_operation;
        let height = self.config.virtual_world_height;
        let mut drops = Vec::new();

        for _ in 0..blocks {
            let depth = if height == 0 { 0 } else { rng.gen_range(0..height) };

            if rng.gen::<f32>() < FILLER_CHANCE {
                if levels.silk_touch && rng.gen::<f32>() < SILK_TOUCH_STONE_CHANCE {
                    drops.push(ResourceStack::vanilla("stone", 1));
                }
                continue;
            }

            let Some(entry) = self.ores.pick_weighted(zone, rng) else {
                continue;
            };
            let multiplier = entry.height_multiplier(depth);
            if multiplier <= 0.0 || rng.gen::<f32>() > multiplier {
                trace!(resource = %entry.resource, depth, "ore rejected at depth");
                continue;
            }

            drops.extend(self.node_drops(&entry.resource, levels, rng));
        }

        self.stats
            .blocks_mined
            .fetch_add(u64::from(blocks), Ordering::Relaxed);
        merge_stacks(drops)
    }

    fn node_drops(
        &self,
        resource: &ResourceType,
        levels: ModifierLevels,
        rng: &mut dyn RngCore,
    ) -> Vec<ResourceStack> {
        if levels.silk_touch {
            return vec![resource.to_stack(1)];
        }

        let mut drops = match self.items.natural_drops(resource, levels.fortune, rng) {
            Ok(drops) => drops,
            Err(err) => {
                debug!(%resource, %err, "natural drops unavailable; dropping the node itself");
                vec![resource.to_stack(1)]
            }
        };

        if levels.fortune > 0 && self.is_fortune_affected(resource) {
            for stack in &mut drops {
                stack.grow(rng.gen_range(0..=levels.fortune));
            }
        }
        drops
    }

    /// Vanilla fortune ores, or anything tagged as a gem or crystal.
    pub fn is_fortune_affected(&self, resource: &ResourceType) -> bool {
        if resource.key.namespace() == DEFAULT_NAMESPACE
            && FORTUNE_ORES.contains(&resource.key.path())
        {
            return true;
        }
        self.items
            .dictionary_tags(resource)
            .iter()
            .any(|tag| tag.starts_with("gem") || tag.contains("crystal") || tag.contains("Crystal"))
    }

    /// Ticks between operations: efficiency shortens it down to the floor.
    pub fn calculate_operation_ticks(&self, catalyst: &Catalyst) -> u32 {
        calculate_operation_ticks(&self.config, catalyst)
    }

    /// Energy per operation: efficiency costs 20% extra per level.
    pub fn calculate_energy_per_operation(&self, catalyst: &Catalyst) -> u32 {
        calculate_energy_per_operation(&self.config, catalyst)
    }
}

/// `max(min_ticks, floor(base * (1 - efficiency * speed_bonus)))`.
pub fn calculate_operation_ticks(config: &SimulationConfig, catalyst: &Catalyst) -> u32 {
    let efficiency = catalyst.level(ModifierType::Efficiency);
    let mut ticks = config.base_ticks_per_operation;
    if efficiency > 0 {
        let reduction = f64::from(efficiency) * config.efficiency_speed_bonus;
        ticks = (f64::from(config.base_ticks_per_operation) * (1.0 - reduction))
            .floor()
            .max(0.0) as u32;
    }
    ticks.max(config.min_ticks_per_operation)
}

/// `base + floor(base * efficiency * 0.2)`, saturating.
pub fn calculate_energy_per_operation(config: &SimulationConfig, catalyst: &Catalyst) -> u32 {
    let efficiency = u64::from(catalyst.level(ModifierType::Efficiency));
    let base = u64::from(config.energy_per_operation);
    let energy = base + base * efficiency / 5;
    u32::try_from(energy).unwrap_or(u32::MAX)
}

/// Consolidate stacks sharing `(item, variant, tag)`. Output keeps the order
/// in which each key first appeared; empty stacks are dropped.
pub fn merge_stacks(input: impl IntoIterator<Item = ResourceStack>) -> Vec<ResourceStack> {
    let mut merged: Vec<ResourceStack> = Vec::new();
    let mut index: HashMap<StackKey, usize> = HashMap::new();

    for stack in input {
        if stack.is_empty() {
            continue;
        }
        let key = stack.merge_key();
        match index.get(&key) {
            Some(&slot) => merged[slot].grow(stack.count),
            None => {
                index.insert(key, merged.len());
                merged.push(stack);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarrysim_core::{ComponentMap, ComponentValue, RegistryKey};

    fn catalyst(efficiency: u32) -> Catalyst {
        Catalyst::empty().with(ModifierType::Efficiency, efficiency)
    }

    #[test]
    fn mode_names_roundtrip() {
        for mode in SimulationMode::ALL {
            assert_eq!(SimulationMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(SimulationMode::parse("Mob-Drops"), Some(SimulationMode::MobDrops));
        assert_eq!(SimulationMode::Mining.next().next().next(), SimulationMode::Mining);
        assert_eq!(SimulationMode::parse("fishing"), None);
    }

    #[test]
    fn ticks_shrink_with_efficiency_down_to_the_floor() {
        let config = SimulationConfig::default();
        assert_eq!(calculate_operation_ticks(&config, &catalyst(0)), 100);
        assert_eq!(calculate_operation_ticks(&config, &catalyst(1)), 85);
        assert_eq!(calculate_operation_ticks(&config, &catalyst(5)), 25);
        assert_eq!(calculate_operation_ticks(&config, &catalyst(6)), 10);
        assert_eq!(calculate_operation_ticks(&config, &catalyst(50)), 10);
    }

    #[test]
    fn energy_grows_twenty_percent_per_level() {
        let config = SimulationConfig::default();
        assert_eq!(calculate_energy_per_operation(&config, &catalyst(0)), 1000);
        assert_eq!(calculate_energy_per_operation(&config, &catalyst(1)), 1200);
        assert_eq!(calculate_energy_per_operation(&config, &catalyst(5)), 2000);

        let odd = SimulationConfig {
            energy_per_operation: 7,
            ..SimulationConfig::default()
        };
        assert_eq!(calculate_energy_per_operation(&odd, &catalyst(1)), 8);
    }

    #[test]
    fn merge_keeps_first_occurrence_order_and_tags_apart() {
        let tagged = ResourceStack::vanilla("diamond", 1).with_tag(
            ComponentMap::new().with(RegistryKey::quarry("origin"), ComponentValue::String("quarry".into())),
        );
        let merged = merge_stacks(vec![
            ResourceStack::vanilla("coal", 2),
            ResourceStack::vanilla("diamond", 1),
            ResourceStack::vanilla("coal", 0),
            tagged.clone(),
            ResourceStack::vanilla("coal", 3),
            ResourceStack::with_variant(RegistryKey::vanilla("dye"), 4, 5),
            ResourceStack::vanilla("diamond", 2),
        ]);
        assert_eq!(
            merged,
            vec![
                ResourceStack::vanilla("coal", 5),
                ResourceStack::vanilla("diamond", 3),
                tagged,
                ResourceStack::with_variant(RegistryKey::vanilla("dye"), 4, 5),
            ]
        );
    }

    #[test]
    fn empty_input_merges_to_nothing() {
        assert!(merge_stacks(Vec::new()).is_empty());
        assert!(merge_stacks(vec![ResourceStack::vanilla("coal", 0)]).is_empty());
    }
}
