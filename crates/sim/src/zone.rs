//! Environment zones (the biome-equivalent a quarry is tuned to).

use quarrysim_core::{RegistryKey, RegistryKeyError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an environment zone, e.g. `minecraft:plains` or `minecraft:hell`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(RegistryKey);

impl ZoneId {
    /// Wrap a registry key.
    pub fn new(key: RegistryKey) -> Self {
        Self(key)
    }

    /// Vanilla zone by path.
    pub fn vanilla(path: &str) -> Self {
        Self(RegistryKey::vanilla(path))
    }

    /// Parse `namespace:path` (namespace defaults to `minecraft`).
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        RegistryKey::parse(input).map(Self)
    }

    /// Underlying key.
    pub fn key(&self) -> &RegistryKey {
        &self.0
    }

    /// Nether-like zones receive the quartz/magma ore seeds.
    pub fn is_hell(&self) -> bool {
        self.0.path().to_lowercase().contains("hell")
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
