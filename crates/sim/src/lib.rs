//! Virtual resource simulation: what a quarry *would* extract from a zone,
//! sampled from weighted ore, monster and loot tables without touching any
//! world state.
//!
//! [`VirtualMiningSimulator`] is the entry point. It owns the seeded
//! registries and borrows the host collaborators declared in [`catalog`] and
//! [`loot`]; [`vanilla`] provides reference implementations of those.

pub mod catalog;
pub mod config;
pub mod loot;
pub mod mob_drops;
pub mod monster;
pub mod ore;
pub mod simulator;
pub mod vanilla;
pub mod weighted;
pub mod zone;

pub use catalog::{CatalogError, EnvironmentCatalog, ItemCatalog, MonsterSpawnEntry};
pub use config::{ConfigError, SimulationConfig};
pub use loot::{
    CustomDropEntry, Difficulty, LootContext, LootEngine, LootError, LootLoadListener, LootPool,
    LootTable, LootTableManager, PoolEntry, TableLootEngine, UniformRange, MAIN_POOL,
};
pub use mob_drops::MonsterDropSimulator;
pub use monster::{MonsterFamily, MonsterKind};
pub use ore::{classify_ore_tag, OreClassifier, OreEntry, OreProfile, OreRegistry};
pub use simulator::{
    calculate_energy_per_operation, calculate_operation_ticks, merge_stacks, Collaborators,
    SimulationContext, SimulationMode, SimulationStatistics, StatisticsSnapshot,
    VirtualMiningSimulator,
};
pub use zone::ZoneId;
