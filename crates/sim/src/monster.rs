//! Known monster kinds, their trophies and their fallback drop tables.
//!
//! Monsters are identified by registry key everywhere else; this module only
//! gives the vanilla hostiles a typed handle so trophies and fallback drops can
//! be looked up without string matching at the call sites.

use quarrysim_core::{RegistryKey, ResourceStack, DEFAULT_NAMESPACE};
use rand::{Rng, RngCore};

/// Vanilla hostile monsters the simulator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MonsterKind {
    Zombie,
    Husk,
    ZombieVillager,
    ZombiePigman,
    Skeleton,
    Stray,
    WitherSkeleton,
    Creeper,
    Spider,
    CaveSpider,
    Enderman,
    Witch,
    Slime,
    MagmaCube,
    Blaze,
    Ghast,
    Guardian,
    Shulker,
}

/// Fallback drop families; subtypes share their parent's byproducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterFamily {
    Zombie,
    Skeleton,
    Spider,
    Creeper,
    Slime,
    Other,
}

/// One line of a fallback table: independent chance, uniform count range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackDrop {
    pub item: &'static str,
    pub chance: f32,
    pub min: u32,
    pub max: u32,
}

const ZOMBIE_FALLBACK: &[FallbackDrop] = &[FallbackDrop {
    item: "rotten_flesh",
    chance: 0.5,
    min: 1,
    max: 2,
}];

const SKELETON_FALLBACK: &[FallbackDrop] = &[
    FallbackDrop {
        item: "bone",
        chance: 0.5,
        min: 1,
        max: 2,
    },
    FallbackDrop {
        item: "arrow",
        chance: 0.5,
        min: 1,
        max: 2,
    },
];

const SPIDER_FALLBACK: &[FallbackDrop] = &[
    FallbackDrop {
        item: "string",
        chance: 0.5,
        min: 1,
        max: 2,
    },
    FallbackDrop {
        item: "spider_eye",
        chance: 0.33,
        min: 1,
        max: 1,
    },
];

const CREEPER_FALLBACK: &[FallbackDrop] = &[FallbackDrop {
    item: "gunpowder",
    chance: 1.0,
    min: 1,
    max: 2,
}];

const SLIME_FALLBACK: &[FallbackDrop] = &[FallbackDrop {
    item: "slime_ball",
    chance: 1.0,
    min: 1,
    max: 2,
}];

impl MonsterKind {
    /// Every known kind.
    pub const ALL: [MonsterKind; 18] = [
        MonsterKind::Zombie,
        MonsterKind::Husk,
        MonsterKind::ZombieVillager,
        MonsterKind::ZombiePigman,
        MonsterKind::Skeleton,
        MonsterKind::Stray,
        MonsterKind::WitherSkeleton,
        MonsterKind::Creeper,
        MonsterKind::Spider,
        MonsterKind::CaveSpider,
        MonsterKind::Enderman,
        MonsterKind::Witch,
        MonsterKind::Slime,
        MonsterKind::MagmaCube,
        MonsterKind::Blaze,
        MonsterKind::Ghast,
        MonsterKind::Guardian,
        MonsterKind::Shulker,
    ];

    /// Canonical registry path.
    pub const fn as_str(self) -> &'static str {
        match self {
            MonsterKind::Zombie => "zombie",
            MonsterKind::Husk => "husk",
            MonsterKind::ZombieVillager => "zombie_villager",
            MonsterKind::ZombiePigman => "zombie_pigman",
            MonsterKind::Skeleton => "skeleton",
            MonsterKind::Stray => "stray",
            MonsterKind::WitherSkeleton => "wither_skeleton",
            MonsterKind::Creeper => "creeper",
            MonsterKind::Spider => "spider",
            MonsterKind::CaveSpider => "cave_spider",
            MonsterKind::Enderman => "enderman",
            MonsterKind::Witch => "witch",
            MonsterKind::Slime => "slime",
            MonsterKind::MagmaCube => "magma_cube",
            MonsterKind::Blaze => "blaze",
            MonsterKind::Ghast => "ghast",
            MonsterKind::Guardian => "guardian",
            MonsterKind::Shulker => "shulker",
        }
    }

    /// Parse a monster kind from its path (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_lowercase();
        let key = key.strip_prefix("minecraft:").unwrap_or(&key);
        match key {
            "pigman" | "zombified_piglin" => Some(MonsterKind::ZombiePigman),
            other => Self::ALL.into_iter().find(|kind| kind.as_str() == other),
        }
    }

    /// Kind for a vanilla monster key; modded keys are unknown.
    pub fn from_key(key: &RegistryKey) -> Option<Self> {
        if key.namespace() != DEFAULT_NAMESPACE {
            return None;
        }
        Self::parse(key.path())
    }

    /// Vanilla registry key.
    pub fn key(self) -> RegistryKey {
        RegistryKey::vanilla(self.as_str())
    }

    /// Fallback family. Zombie subtypes inherit the zombie table; strays and
    /// wither skeletons are not skeletons here and have no fallback.
    pub fn family(self) -> MonsterFamily {
        match self {
            MonsterKind::Zombie
            | MonsterKind::Husk
            | MonsterKind::ZombieVillager
            | MonsterKind::ZombiePigman => MonsterFamily::Zombie,
            MonsterKind::Skeleton => MonsterFamily::Skeleton,
            MonsterKind::Spider => MonsterFamily::Spider,
            MonsterKind::Creeper => MonsterFamily::Creeper,
            MonsterKind::Slime => MonsterFamily::Slime,
            _ => MonsterFamily::Other,
        }
    }

    /// Rare trophy dropped by this exact kind, if any.
    pub fn trophy(self) -> Option<ResourceStack> {
        let skull = |variant| ResourceStack::with_variant(RegistryKey::vanilla("skull"), variant, 1);
        match self {
            MonsterKind::Skeleton => Some(skull(0)),
            MonsterKind::WitherSkeleton => Some(skull(1)),
            MonsterKind::Zombie => Some(skull(2)),
            MonsterKind::Creeper => Some(skull(4)),
            MonsterKind::Enderman => Some(ResourceStack::vanilla("ender_pearl", 1)),
            _ => None,
        }
    }
}

impl MonsterFamily {
    /// Static fallback table for the family.
    pub fn fallback_table(self) -> &'static [FallbackDrop] {
        match self {
            MonsterFamily::Zombie => ZOMBIE_FALLBACK,
            MonsterFamily::Skeleton => SKELETON_FALLBACK,
            MonsterFamily::Spider => SPIDER_FALLBACK,
            MonsterFamily::Creeper => CREEPER_FALLBACK,
            MonsterFamily::Slime => SLIME_FALLBACK,
            MonsterFamily::Other => &[],
        }
    }

    /// Roll the fallback table. Each line is independent.
    pub fn roll_fallback(self, rng: &mut dyn RngCore) -> Vec<ResourceStack> {
        let mut drops = Vec::new();
        for line in self.fallback_table() {
            if line.chance < 1.0 && rng.gen::<f32>() >= line.chance {
                continue;
            }
            let count = if line.min == line.max {
                line.min
            } else {
                rng.gen_range(line.min..=line.max)
            };
            drops.push(ResourceStack::vanilla(line.item, count));
        }
        drops
    }
}
