#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod components;
pub mod item;
pub mod modifier;
pub mod registry;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use components::{ComponentMap, ComponentValue};
pub use item::{ResourceStack, ResourceType, StackKey};
pub use modifier::{Catalyst, Modifier, ModifierType};
pub use registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE, QUARRY_NAMESPACE};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG seeded by run + zone + tick domains.
pub fn scoped_rng(run_seed: u64, zone_hash: u64, tick: SimTick) -> StdRng {
    let seed = run_seed ^ zone_hash ^ tick.0;
    StdRng::seed_from_u64(seed)
}
