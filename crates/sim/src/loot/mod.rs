//! Loot tables: the engine boundary, a data-driven engine, and the quarry's
//! weighted catalog on top of it.
//!
//! A [`LootTable`] is a list of pools. Each pool rolls a number of times
//! (plus `bonus_rolls * luck`), and every roll picks one [`PoolEntry`] by
//! luck-adjusted weight among the entries whose conditions hold.

mod engine;
mod manager;

pub use engine::TableLootEngine;
pub use manager::{CustomDropEntry, LootTableManager};

use quarrysim_core::{RegistryKey, ResourceStack, ResourceType};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::weighted;

/// Name of the pool injections are appended to.
pub const MAIN_POOL: &str = "main";

/// Game difficulty as seen by loot conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

/// Simulated surroundings of a loot roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootContext {
    pub difficulty: Difficulty,
    /// Ticks the surrounding area has been inhabited; gates time-locked entries.
    pub inhabited_ticks: u64,
    pub moon_phase_factor: f32,
}

impl Default for LootContext {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            inhabited_ticks: 0,
            moon_phase_factor: 1.0,
        }
    }
}

/// Loot engine failures. Callers never propagate these past the simulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LootError {
    #[error("loot table {0} is not defined")]
    UnknownTable(RegistryKey),
    #[error("loot table {table} is malformed: {reason}")]
    Malformed { table: RegistryKey, reason: String },
    #[error("loot engine unavailable: {0}")]
    Unavailable(String),
}

/// Notified whenever the engine loads (or reloads) a table.
pub trait LootLoadListener: Send + Sync {
    /// May mutate the table before it is first used.
    fn on_table_loaded(&self, id: &RegistryKey, table: &mut LootTable);
}

/// External loot-table engine boundary.
pub trait LootEngine: Send + Sync {
    /// Generate stacks from table `id`.
    fn generate(
        &self,
        id: &RegistryKey,
        luck: f32,
        ctx: &LootContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, LootError>;

    /// Register a load listener. Engines without load events may ignore it.
    fn subscribe(&self, listener: Arc<dyn LootLoadListener>);
}

/// Inclusive integer range used for roll and count ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: u32,
    pub max: u32,
}

impl UniformRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: u32) -> Self {
        Self::new(value, value)
    }

    fn sample(self, rng: &mut dyn RngCore) -> u32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// One weighted choice inside a pool. `item: None` is an explicit empty roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    #[serde(default)]
    pub item: Option<ResourceType>,
    pub weight: u32,
    /// Weight gained per point of luck (may be negative).
    #[serde(default)]
    pub quality: i32,
    #[serde(default = "default_count")]
    pub count: UniformRange,
    /// Entry only eligible once the area has been inhabited this long.
    #[serde(default)]
    pub min_inhabited_ticks: Option<u64>,
}

fn default_count() -> UniformRange {
    UniformRange::exactly(1)
}

impl PoolEntry {
    pub fn item(item: ResourceType, weight: u32, count: UniformRange) -> Self {
        Self {
            item: Some(item),
            weight,
            quality: 0,
            count,
            min_inhabited_ticks: None,
        }
    }

    pub fn empty(weight: u32) -> Self {
        Self {
            item: None,
            weight,
            quality: 0,
            count: UniformRange::exactly(0),
            min_inhabited_ticks: None,
        }
    }

    pub fn with_quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }

    pub fn requires_inhabited(mut self, ticks: u64) -> Self {
        self.min_inhabited_ticks = Some(ticks);
        self
    }

    /// `max(0, weight + floor(quality * luck))`.
    pub fn effective_weight(&self, luck: f32) -> u32 {
        let adjusted = self.weight as f32 + (self.quality as f32 * luck).floor();
        adjusted.max(0.0) as u32
    }

    fn eligible(&self, ctx: &LootContext) -> bool {
        self.min_inhabited_ticks
            .map_or(true, |ticks| ctx.inhabited_ticks >= ticks)
    }
}

/// A named group of entries rolled together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootPool {
    pub name: String,
    pub rolls: UniformRange,
    #[serde(default)]
    pub bonus_rolls: f32,
    pub entries: Vec<PoolEntry>,
}

impl LootPool {
    pub fn new(name: impl Into<String>, rolls: UniformRange, entries: Vec<PoolEntry>) -> Self {
        Self {
            name: name.into(),
            rolls,
            bonus_rolls: 0.0,
            entries,
        }
    }

    pub fn add_entry(&mut self, entry: PoolEntry) {
        self.entries.push(entry);
    }

    fn roll(&self, luck: f32, ctx: &LootContext, rng: &mut dyn RngCore, out: &mut Vec<ResourceStack>) {
        let bonus = (self.bonus_rolls * luck).floor().max(0.0) as u32;
        let rolls = self.rolls.sample(rng).saturating_add(bonus);

        let eligible: Vec<&PoolEntry> = self.entries.iter().filter(|e| e.eligible(ctx)).collect();
        for _ in 0..rolls {
            let Some(entry) = weighted::pick_by(&eligible, |e| e.effective_weight(luck), rng) else {
                break;
            };
            let Some(item) = &entry.item else {
                continue;
            };
            let count = entry.count.sample(rng);
            if count > 0 {
                out.push(item.to_stack(count));
            }
        }
    }
}

/// A loaded loot table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub pools: Vec<LootPool>,
}

impl LootTable {
    pub fn new(pools: Vec<LootPool>) -> Self {
        Self { pools }
    }

    /// Mutable handle to a pool by name.
    pub fn pool_mut(&mut self, name: &str) -> Option<&mut LootPool> {
        self.pools.iter_mut().find(|p| p.name == name)
    }

    pub fn pool(&self, name: &str) -> Option<&LootPool> {
        self.pools.iter().find(|p| p.name == name)
    }

    /// Structural problems that make the table unusable.
    pub fn validate(&self, id: &RegistryKey) -> Result<(), LootError> {
        for pool in &self.pools {
            if pool.rolls.min > pool.rolls.max {
                return Err(LootError::Malformed {
                    table: id.clone(),
                    reason: format!("pool '{}' has inverted roll range", pool.name),
                });
            }
            if let Some(entry) = pool.entries.iter().find(|e| e.count.min > e.count.max) {
                return Err(LootError::Malformed {
                    table: id.clone(),
                    reason: format!(
                        "pool '{}' entry {:?} has inverted count range",
                        pool.name,
                        entry.item.as_ref().map(ToString::to_string)
                    ),
                });
            }
        }
        Ok(())
    }

    /// Roll every pool once.
    pub fn generate(&self, luck: f32, ctx: &LootContext, rng: &mut dyn RngCore) -> Vec<ResourceStack> {
        let mut out = Vec::new();
        for pool in &self.pools {
            pool.roll(luck, ctx, rng, &mut out);
        }
        out
    }
}
