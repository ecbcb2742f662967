//! Host collaborators the simulator reads from but does not own.

use crate::zone::ZoneId;
use quarrysim_core::{RegistryKey, ResourceStack, ResourceType};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One spawnable monster in a zone with its natural spawn weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSpawnEntry {
    pub monster: RegistryKey,
    pub spawn_weight: u32,
}

impl MonsterSpawnEntry {
    pub fn new(monster: RegistryKey, spawn_weight: u32) -> Self {
        Self {
            monster,
            spawn_weight,
        }
    }
}

/// Zones and their spawn tables.
pub trait EnvironmentCatalog: Send + Sync {
    /// Every zone the host knows about.
    fn zones(&self) -> Vec<ZoneId>;

    /// Hostile spawn table of `zone`; unknown zones have none.
    fn monsters(&self, zone: &ZoneId) -> Vec<MonsterSpawnEntry>;

    /// Current lunar-phase factor in `[0, 1]`.
    fn moon_phase_factor(&self) -> f32;
}

/// Failures reported by an [`ItemCatalog`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown resource type {0}")]
    UnknownType(ResourceType),
    #[error("drop computation failed for {resource}: {reason}")]
    DropsFailed {
        resource: ResourceType,
        reason: String,
    },
}

/// Item/block knowledge: natural drops and dictionary tags.
pub trait ItemCatalog: Send + Sync {
    /// Natural drops of a mined node, with the fortune level passed through.
    fn natural_drops(
        &self,
        resource: &ResourceType,
        fortune: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, CatalogError>;

    /// Dictionary tags (e.g. `oreCopper`, `gemRuby`) attached to a type.
    fn dictionary_tags(&self, resource: &ResourceType) -> Vec<String>;

    /// Every dictionary tag with its member types, in a stable order.
    fn dictionary_entries(&self) -> Vec<(String, Vec<ResourceType>)>;

    /// Whether `resource` is a placeable block (only blocks can be ore nodes).
    fn is_block(&self, resource: &ResourceType) -> bool;
}
