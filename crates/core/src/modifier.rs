//! Yield modifiers and the catalyst item that carries them.

use serde::{Deserialize, Serialize};

/// Named modifiers a catalyst can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    /// Extra ore drops while mining.
    Fortune,
    /// Mined nodes drop themselves instead of their natural drops.
    SilkTouch,
    /// Bonus monster drops and trophy chance.
    Looting,
    /// Luck passed to loot-table generation.
    Luck,
    /// Faster operations at a higher energy cost.
    Efficiency,
}

impl ModifierType {
    /// Canonical lowercase key for configs/logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            ModifierType::Fortune => "fortune",
            ModifierType::SilkTouch => "silk_touch",
            ModifierType::Looting => "looting",
            ModifierType::Luck => "luck",
            ModifierType::Efficiency => "efficiency",
        }
    }

    /// Parse a modifier from its key (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_lowercase();
        match key.as_str() {
            "fortune" => Some(ModifierType::Fortune),
            "silk_touch" | "silktouch" => Some(ModifierType::SilkTouch),
            "looting" => Some(ModifierType::Looting),
            "luck" | "luck_of_the_sea" => Some(ModifierType::Luck),
            "efficiency" => Some(ModifierType::Efficiency),
            _ => None,
        }
    }

    /// Vanilla maximum level; informational, levels are never clamped.
    pub fn max_level(self) -> u32 {
        match self {
            ModifierType::Fortune => 3,
            ModifierType::SilkTouch => 1,
            ModifierType::Looting => 3,
            ModifierType::Luck => 3,
            ModifierType::Efficiency => 5,
        }
    }
}

/// A modifier with a specific level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    /// The type of modifier.
    pub kind: ModifierType,
    /// The level of the modifier.
    pub level: u32,
}

impl Modifier {
    /// Create a new modifier.
    pub fn new(kind: ModifierType, level: u32) -> Self {
        Self { kind, level }
    }
}

/// Read-only modifier carrier (the enchanted-book equivalent).
///
/// An empty catalyst means "no modifiers"; every level then resolves to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalyst {
    modifiers: Vec<Modifier>,
}

impl Catalyst {
    /// Catalyst without modifiers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace a modifier. Level 0 removes it.
    pub fn with(mut self, kind: ModifierType, level: u32) -> Self {
        self.modifiers.retain(|m| m.kind != kind);
        if level > 0 {
            self.modifiers.push(Modifier::new(kind, level));
        }
        self
    }

    /// Level of `kind`, 0 if absent.
    pub fn level(&self, kind: ModifierType) -> u32 {
        self.modifiers
            .iter()
            .find(|m| m.kind == kind)
            .map(|m| m.level)
            .unwrap_or(0)
    }

    /// Iterate over carried modifiers.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    /// Whether the catalyst carries any modifier the quarry reads.
    pub fn is_useful(&self) -> bool {
        !self.modifiers.is_empty()
    }
}

impl FromIterator<Modifier> for Catalyst {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Catalyst::empty(), |c, m| c.with(m.kind, m.level))
    }
}
