//! Reference collaborators modelled on the vanilla game, so the simulator can
//! run without a host.

mod catalog;
mod environment;
mod loot_tables;

pub use catalog::{DropRule, FortuneRule, VanillaItemCatalog};
pub use environment::{VanillaEnvironment, MOON_PHASE_FACTORS};
pub use loot_tables::vanilla_loot_tables;

use std::sync::Arc;

use crate::loot::TableLootEngine;
use crate::simulator::Collaborators;

/// Vanilla environment, item catalog and loot engine wired together.
pub fn vanilla_collaborators() -> Collaborators {
    Collaborators {
        environment: Arc::new(VanillaEnvironment::new()),
        items: Arc::new(VanillaItemCatalog::new()),
        loot: Arc::new(TableLootEngine::with_vanilla_tables()),
    }
}
