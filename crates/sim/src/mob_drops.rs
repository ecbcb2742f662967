//! Virtual monster kills: pick a monster the zone would spawn and roll what it
//! would drop.

use std::collections::HashMap;

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceStack};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::catalog::{EnvironmentCatalog, MonsterSpawnEntry};
use crate::loot::{Difficulty, LootContext, LootEngine};
use crate::monster::{MonsterFamily, MonsterKind};
use crate::weighted;
use crate::zone::ZoneId;

/// Inhabited time assumed for every simulated kill (a long-settled chunk).
pub const SIMULATED_INHABITED_TICKS: u64 = 100_000;
/// Chance per bonus level that each generated stack is duplicated.
pub const BONUS_DUPLICATE_CHANCE: f32 = 0.25;
/// Bonus levels past this add no further duplicate draws.
pub const MAX_DUPLICATE_LEVEL: u32 = 1_000;
/// Trophy chance before bonus levels.
pub const TROPHY_BASE_CHANCE: f32 = 0.025;
/// Trophy chance added per bonus level.
pub const TROPHY_CHANCE_PER_LEVEL: f32 = 0.01;

const MAPPED_MONSTERS: &[MonsterKind] = &[
    MonsterKind::Zombie,
    MonsterKind::Skeleton,
    MonsterKind::Creeper,
    MonsterKind::Spider,
    MonsterKind::Enderman,
    MonsterKind::Witch,
    MonsterKind::Slime,
    MonsterKind::Blaze,
    MonsterKind::Ghast,
    MonsterKind::ZombiePigman,
    MonsterKind::WitherSkeleton,
    MonsterKind::Guardian,
    MonsterKind::Shulker,
];

/// Simulates monster kills per zone.
pub struct MonsterDropSimulator {
    spawn_cache: RwLock<HashMap<ZoneId, Vec<MonsterSpawnEntry>>>,
    loot_tables: RwLock<HashMap<RegistryKey, RegistryKey>>,
}

impl Default for MonsterDropSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MonsterDropSimulator {
    /// Simulator with the common hostiles mapped to their entity tables.
    pub fn new() -> Self {
        let loot_tables = MAPPED_MONSTERS
            .iter()
            .map(|kind| {
                let key = kind.key();
                let table = key.with_path_prefix("entities");
                (key, table)
            })
            .collect();
        Self {
            spawn_cache: RwLock::new(HashMap::new()),
            loot_tables: RwLock::new(loot_tables),
        }
    }

    /// Override (or add) the loot table used for `monster`.
    pub fn register_loot_table(&self, monster: RegistryKey, table: RegistryKey) {
        self.loot_tables.write().insert(monster, table);
    }

    /// Spawn table of `zone`, cached after the first query.
    pub fn monsters_for_zone(
        &self,
        environment: &dyn EnvironmentCatalog,
        zone: &ZoneId,
    ) -> Vec<MonsterSpawnEntry> {
        if let Some(cached) = self.spawn_cache.read().get(zone) {
            return cached.clone();
        }
        let monsters = environment.monsters(zone);
        self.spawn_cache
            .write()
            .entry(zone.clone())
            .or_insert(monsters)
            .clone()
    }

    pub fn monster_variety(&self, environment: &dyn EnvironmentCatalog, zone: &ZoneId) -> usize {
        self.monsters_for_zone(environment, zone).len()
    }

    pub fn has_monsters(&self, environment: &dyn EnvironmentCatalog, zone: &ZoneId) -> bool {
        !self.monsters_for_zone(environment, zone).is_empty()
    }

    /// Loot table for `monster`: the explicit mapping, else
    /// `namespace:entities/<path>` (remembered for next time).
    pub fn loot_table_for(&self, monster: &RegistryKey) -> RegistryKey {
        if let Some(table) = self.loot_tables.read().get(monster) {
            return table.clone();
        }
        let table = monster.with_path_prefix("entities");
        self.loot_tables
            .write()
            .entry(monster.clone())
            .or_insert(table)
            .clone()
    }

    /// Drops of one simulated kill in `zone` with `bonus_level` looting.
    ///
    /// Never fails: a loot engine error yields the monster family's fallback
    /// drops instead.
    pub fn simulate_kill(
        &self,
        environment: &dyn EnvironmentCatalog,
        engine: &dyn LootEngine,
        zone: &ZoneId,
        bonus_level: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<ResourceStack> {
        let monsters = self.monsters_for_zone(environment, zone);
        let Some(spawn) = weighted::pick_by(&monsters, |m| m.spawn_weight, rng) else {
            return Vec::new();
        };
        let monster = spawn.monster.clone();
        let kind = MonsterKind::from_key(&monster);
        let table = self.loot_table_for(&monster);

        let ctx = LootContext {
            difficulty: Difficulty::Hard,
            inhabited_ticks: SIMULATED_INHABITED_TICKS,
            moon_phase_factor: environment.moon_phase_factor(),
        };

        match engine.generate(&table, bonus_level as f32, &ctx, rng) {
            Ok(mut drops) => {
                if bonus_level > 0 {
                    apply_bonus_duplicates(&mut drops, bonus_level, rng);
                }
                let trophy_chance = TROPHY_BASE_CHANCE + TROPHY_CHANCE_PER_LEVEL * bonus_level as f32;
                if rng.gen::<f32>() < trophy_chance {
                    if let Some(trophy) = kind.and_then(MonsterKind::trophy) {
                        drops.push(trophy);
                    }
                }
                drops
            }
            Err(err) => {
                let family = kind.map_or(MonsterFamily::Other, MonsterKind::family);
                debug!(%monster, %table, %err, ?family, "loot engine failed; using fallback drops");
                family.roll_fallback(rng)
            }
        }
    }
}

fn apply_bonus_duplicates(drops: &mut Vec<ResourceStack>, level: u32, rng: &mut dyn RngCore) {
    let draws = level.min(MAX_DUPLICATE_LEVEL);
    let mut bonus = Vec::new();
    for stack in drops.iter() {
        for _ in 0..draws {
            if rng.gen::<f32>() < BONUS_DUPLICATE_CHANCE {
                bonus.push(stack.clone());
            }
        }
    }
    drops.extend(bonus);
}
