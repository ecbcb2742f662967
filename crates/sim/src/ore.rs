//! Zone ore tables: which nodes a virtual block can turn out to be, how often,
//! and at which depths.

use std::collections::HashMap;

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceType};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{EnvironmentCatalog, ItemCatalog};
use crate::weighted;
use crate::zone::ZoneId;

/// A candidate ore node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreEntry {
    pub resource: ResourceType,
    pub vein_size: u32,
    pub min_depth: u32,
    pub max_depth: u32,
    pub weight: u32,
}

impl OreEntry {
    pub fn new(resource: ResourceType, vein_size: u32, min_depth: u32, max_depth: u32, weight: u32) -> Self {
        Self {
            resource,
            vein_size,
            min_depth,
            max_depth,
            weight,
        }
    }

    /// Acceptance probability at `depth`: 0 outside the band, 1.0 in the
    /// middle, 0.5 at the edges.
    pub fn height_multiplier(&self, depth: u32) -> f32 {
        if depth < self.min_depth || depth > self.max_depth {
            return 0.0;
        }
        let mid = (self.min_depth + self.max_depth) / 2;
        let range = (self.max_depth - self.min_depth) / 2;
        if range == 0 {
            return 1.0;
        }
        let distance = depth.abs_diff(mid) as f32 / range as f32;
        1.0 - distance * 0.5
    }
}

/// Vein parameters guessed for a dictionary ore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OreProfile {
    pub vein_size: u32,
    pub min_depth: u32,
    pub max_depth: u32,
    pub weight: u32,
}

impl OreProfile {
    const fn new(vein_size: u32, min_depth: u32, max_depth: u32, weight: u32) -> Self {
        Self {
            vein_size,
            min_depth,
            max_depth,
            weight,
        }
    }

    fn entry_for(self, resource: ResourceType) -> OreEntry {
        OreEntry::new(resource, self.vein_size, self.min_depth, self.max_depth, self.weight)
    }
}

/// Maps a dictionary tag (e.g. `oreCopper`) to vein parameters.
pub type OreClassifier = fn(&str) -> OreProfile;

/// Substring heuristic over well-known modded metals. Approximate: any tag it
/// does not recognise gets a generic mid-depth profile.
pub fn classify_ore_tag(tag: &str) -> OreProfile {
    let name = tag.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["copper", "tin"]) {
        OreProfile::new(9, 0, 64, 15)
    } else if has(&["silver", "lead"]) {
        OreProfile::new(9, 0, 32, 8)
    } else if has(&["uranium", "platinum"]) {
        OreProfile::new(4, 0, 16, 1)
    } else if has(&["nickel", "aluminum", "aluminium"]) {
        OreProfile::new(6, 0, 48, 6)
    } else if has(&["osmium", "zinc"]) {
        OreProfile::new(8, 0, 48, 8)
    } else {
        OreProfile::new(6, 0, 48, 5)
    }
}

fn default_universal_ores() -> Vec<OreEntry> {
    let stone = |variant| ResourceType::with_variant(RegistryKey::vanilla("stone"), variant);
    vec![
        OreEntry::new(ResourceType::vanilla("coal_ore"), 17, 0, 128, 20),
        OreEntry::new(ResourceType::vanilla("iron_ore"), 9, 0, 64, 20),
        OreEntry::new(ResourceType::vanilla("gold_ore"), 9, 0, 32, 2),
        OreEntry::new(ResourceType::vanilla("redstone_ore"), 8, 0, 16, 8),
        OreEntry::new(ResourceType::vanilla("diamond_ore"), 8, 0, 16, 1),
        OreEntry::new(ResourceType::vanilla("lapis_ore"), 7, 0, 32, 1),
        OreEntry::new(stone(1), 33, 0, 80, 10),
        OreEntry::new(stone(3), 33, 0, 80, 10),
        OreEntry::new(stone(5), 33, 0, 80, 10),
        OreEntry::new(ResourceType::vanilla("dirt"), 33, 0, 256, 10),
        OreEntry::new(ResourceType::vanilla("gravel"), 33, 0, 256, 8),
    ]
}

fn hell_ores() -> [OreEntry; 2] {
    [
        OreEntry::new(ResourceType::vanilla("quartz_ore"), 14, 10, 117, 16),
        OreEntry::new(ResourceType::vanilla("magma"), 33, 27, 36, 4),
    ]
}

/// Universal ore list plus per-zone additions.
#[derive(Debug, Default)]
pub struct OreRegistry {
    universal: RwLock<Vec<OreEntry>>,
    zones: RwLock<HashMap<ZoneId, Vec<OreEntry>>>,
}

impl OreRegistry {
    /// Registry with no entries at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seeded registry using [`classify_ore_tag`] for dictionary ores.
    pub fn new(environment: &dyn EnvironmentCatalog, items: &dyn ItemCatalog) -> Self {
        Self::with_classifier(environment, items, classify_ore_tag)
    }

    /// Seeded registry: vanilla ores, then dictionary ores, then the
    /// nether-only ores for every hell zone.
    pub fn with_classifier(
        environment: &dyn EnvironmentCatalog,
        items: &dyn ItemCatalog,
        classifier: OreClassifier,
    ) -> Self {
        let registry = Self::empty();
        *registry.universal.write() = default_universal_ores();

        let mut discovered = 0usize;
        for (tag, members) in items.dictionary_entries() {
            if !tag.starts_with("ore") {
                continue;
            }
            let profile = classifier(&tag);
            for resource in members {
                if !items.is_block(&resource) {
                    debug!(%tag, %resource, "dictionary ore is not a block; skipped");
                    continue;
                }
                if registry.contains_ore(&resource) {
                    continue;
                }
                registry.register_universal_ore(profile.entry_for(resource));
                discovered += 1;
            }
        }

        let mut hell_zones = 0usize;
        for zone in environment.zones().into_iter().filter(ZoneId::is_hell) {
            for entry in hell_ores() {
                registry.register_zone_ore(zone.clone(), entry);
            }
            hell_zones += 1;
        }

        info!(
            universal = registry.universal.read().len(),
            discovered,
            hell_zones,
            "seeded ore registry"
        );
        registry
    }

    fn contains_ore(&self, resource: &ResourceType) -> bool {
        self.universal.read().iter().any(|e| e.resource == *resource)
    }

    /// Append to the list every zone sees.
    pub fn register_universal_ore(&self, entry: OreEntry) {
        self.universal.write().push(entry);
    }

    /// Append to one zone's own list.
    pub fn register_zone_ore(&self, zone: ZoneId, entry: OreEntry) {
        self.zones.write().entry(zone).or_default().push(entry);
    }

    /// Universal entries first, then the zone's own in registration order.
    pub fn entries_for_zone(&self, zone: &ZoneId) -> Vec<OreEntry> {
        let mut entries = self.universal.read().clone();
        if let Some(extra) = self.zones.read().get(zone) {
            entries.extend(extra.iter().cloned());
        }
        entries
    }

    pub fn total_weight(&self, zone: &ZoneId) -> u64 {
        self.entries_for_zone(zone).iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Weighted draw ignoring depth; depth is applied afterwards by the
    /// caller through [`Self::height_multiplier`].
    pub fn pick_weighted(&self, zone: &ZoneId, rng: &mut dyn RngCore) -> Option<OreEntry> {
        let entries = self.entries_for_zone(zone);
        weighted::pick_by(&entries, |e| e.weight, rng).cloned()
    }

    pub fn height_multiplier(&self, entry: &OreEntry, depth: u32) -> f32 {
        entry.height_multiplier(depth)
    }
}
