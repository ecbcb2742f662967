use parking_lot::RwLock;
use quarrysim_core::RegistryKey;

use crate::catalog::{EnvironmentCatalog, MonsterSpawnEntry};
use crate::monster::MonsterKind;
use crate::zone::ZoneId;

/// Moon phase factor for each of the eight lunar phases, full moon first.
pub const MOON_PHASE_FACTORS: [f32; 8] = [1.0, 0.75, 0.5, 0.25, 0.0, 0.25, 0.5, 0.75];

const OVERWORLD_ZONES: &[&str] = &[
    "ocean",
    "plains",
    "extreme_hills",
    "forest",
    "taiga",
    "swampland",
    "river",
    "beaches",
    "jungle",
    "birch_forest",
    "roofed_forest",
    "savanna",
    "mesa",
];

fn spawn(kind: MonsterKind, weight: u32) -> MonsterSpawnEntry {
    MonsterSpawnEntry::new(kind.key(), weight)
}

fn standard_monsters() -> Vec<MonsterSpawnEntry> {
    vec![
        spawn(MonsterKind::Spider, 100),
        spawn(MonsterKind::Zombie, 95),
        spawn(MonsterKind::ZombieVillager, 5),
        spawn(MonsterKind::Skeleton, 100),
        spawn(MonsterKind::Creeper, 100),
        spawn(MonsterKind::Slime, 100),
        spawn(MonsterKind::Enderman, 10),
        spawn(MonsterKind::Witch, 5),
    ]
}

fn desert_monsters() -> Vec<MonsterSpawnEntry> {
    let mut monsters: Vec<_> = standard_monsters()
        .into_iter()
        .map(|entry| match MonsterKind::from_key(&entry.monster) {
            Some(MonsterKind::Zombie) => spawn(MonsterKind::Zombie, 19),
            Some(MonsterKind::ZombieVillager) => spawn(MonsterKind::ZombieVillager, 1),
            _ => entry,
        })
        .collect();
    monsters.push(spawn(MonsterKind::Husk, 80));
    monsters
}

fn ice_plains_monsters() -> Vec<MonsterSpawnEntry> {
    let mut monsters: Vec<_> = standard_monsters()
        .into_iter()
        .map(|entry| match MonsterKind::from_key(&entry.monster) {
            Some(MonsterKind::Skeleton) => spawn(MonsterKind::Skeleton, 20),
            _ => entry,
        })
        .collect();
    monsters.push(spawn(MonsterKind::Stray, 80));
    monsters
}

/// Vanilla zones and their hostile spawn lists.
pub struct VanillaEnvironment {
    zones: RwLock<Vec<(ZoneId, Vec<MonsterSpawnEntry>)>>,
    moon_phase_factor: f32,
}

impl Default for VanillaEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl VanillaEnvironment {
    /// Overworld zones, `desert`, `ice_flats`, `mushroom_island`, `hell` and
    /// `sky`, under a full moon.
    pub fn new() -> Self {
        let mut zones: Vec<(ZoneId, Vec<MonsterSpawnEntry>)> = OVERWORLD_ZONES
            .iter()
            .map(|path| (ZoneId::vanilla(path), standard_monsters()))
            .collect();
        zones.push((ZoneId::vanilla("desert"), desert_monsters()));
        zones.push((ZoneId::vanilla("ice_flats"), ice_plains_monsters()));
        zones.push((ZoneId::vanilla("mushroom_island"), Vec::new()));
        zones.push((
            ZoneId::vanilla("hell"),
            vec![
                spawn(MonsterKind::Ghast, 50),
                spawn(MonsterKind::ZombiePigman, 100),
                spawn(MonsterKind::MagmaCube, 2),
                spawn(MonsterKind::Enderman, 1),
            ],
        ));
        zones.push((ZoneId::vanilla("sky"), vec![spawn(MonsterKind::Enderman, 10)]));

        Self {
            zones: RwLock::new(zones),
            moon_phase_factor: MOON_PHASE_FACTORS[0],
        }
    }

    /// Use the factor of lunar `phase` (taken modulo 8).
    pub fn with_moon_phase(mut self, phase: usize) -> Self {
        self.moon_phase_factor = MOON_PHASE_FACTORS[phase % MOON_PHASE_FACTORS.len()];
        self
    }

    /// Add a zone or replace its spawn list.
    pub fn register_zone(&self, zone: ZoneId, monsters: Vec<MonsterSpawnEntry>) {
        let mut zones = self.zones.write();
        match zones.iter_mut().find(|(id, _)| *id == zone) {
            Some(slot) => slot.1 = monsters,
            None => zones.push((zone, monsters)),
        }
    }

    /// Append one spawn to an existing zone; unknown zones are ignored.
    pub fn add_spawn(&self, zone: &ZoneId, monster: RegistryKey, weight: u32) -> bool {
        match self.zones.write().iter_mut().find(|(id, _)| id == zone) {
            Some((_, monsters)) => {
                monsters.push(MonsterSpawnEntry::new(monster, weight));
                true
            }
            None => false,
        }
    }
}

impl EnvironmentCatalog for VanillaEnvironment {
    fn zones(&self) -> Vec<ZoneId> {
        self.zones.read().iter().map(|(id, _)| id.clone()).collect()
    }

    fn monsters(&self, zone: &ZoneId) -> Vec<MonsterSpawnEntry> {
        self.zones
            .read()
            .iter()
            .find(|(id, _)| id == zone)
            .map(|(_, monsters)| monsters.clone())
            .unwrap_or_default()
    }

    fn moon_phase_factor(&self) -> f32 {
        self.moon_phase_factor
    }
}
