//! JSON content packs that extend the simulator registries.
//!
//! Loading is lenient: a pack that cannot be read or parsed is skipped, and
//! each invalid entry is skipped with a warning while the rest still apply.
//!
//! ```json
//! {
//!   "ores": [{ "block": "othermod:tin_ore", "vein_size": 8, "min_depth": 0, "max_depth": 64, "weight": 10 }],
//!   "zone_ores": [{ "zone": "hell", "block": "othermod:cobalt_ore", "weight": 4 }],
//!   "loot_tables": [{ "id": "quarrysim:quarry/tin", "weight": 3, "table": { "pools": [] } }],
//!   "custom_drops": [{ "item": "minecraft:dye@4", "count": 2, "chance": 0.05 }],
//!   "injections": [{ "table": "minecraft:chests/simple_dungeon", "item": "othermod:tin_ingot", "count": 3, "weight": 5 }],
//!   "monster_loot": [{ "monster": "othermod:ghoul", "table": "minecraft:entities/zombie" }]
//! }
//! ```

use anyhow::{Context, Result};
use quarrysim_core::{RegistryKey, ResourceStack, ResourceType};
use quarrysim_sim::{LootTable, OreEntry, TableLootEngine, VirtualMiningSimulator, ZoneId};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackFile {
    ores: Vec<PackOreDefinition>,
    zone_ores: Vec<PackZoneOreDefinition>,
    loot_tables: Vec<PackLootTableDefinition>,
    custom_drops: Vec<PackCustomDrop>,
    injections: Vec<PackInjection>,
    monster_loot: Vec<PackMonsterLoot>,
}

#[derive(Debug, Deserialize)]
struct PackOreDefinition {
    block: String,
    #[serde(default = "default_vein_size")]
    vein_size: u32,
    #[serde(default)]
    min_depth: u32,
    #[serde(default = "default_max_depth")]
    max_depth: u32,
    weight: u32,
}

#[derive(Debug, Deserialize)]
struct PackZoneOreDefinition {
    zone: String,
    #[serde(flatten)]
    ore: PackOreDefinition,
}

#[derive(Debug, Deserialize)]
struct PackLootTableDefinition {
    id: String,
    weight: u32,
    #[serde(default)]
    table: Option<LootTable>,
}

#[derive(Debug, Deserialize)]
struct PackCustomDrop {
    item: String,
    #[serde(default = "default_count")]
    count: u32,
    chance: f32,
}

#[derive(Debug, Deserialize)]
struct PackInjection {
    table: String,
    item: String,
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default = "default_count")]
    weight: u32,
}

#[derive(Debug, Deserialize)]
struct PackMonsterLoot {
    monster: String,
    table: String,
}

fn default_vein_size() -> u32 {
    8
}

fn default_max_depth() -> u32 {
    64
}

fn default_count() -> u32 {
    1
}

/// How many entries of each kind a pack contributed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub ores: usize,
    pub zone_ores: usize,
    pub loot_tables: usize,
    pub custom_drops: usize,
    pub injections: usize,
    pub monster_loot: usize,
    pub skipped: usize,
}

/// Read the pack at `path` and apply it. Table definitions are only applied
/// when a [`TableLootEngine`] is available.
pub fn load_content_pack(
    path: &Path,
    simulator: &VirtualMiningSimulator,
    engine: Option<&TableLootEngine>,
) -> PackSummary {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Failed to read content pack {}: {err:#}", path.display());
            return PackSummary::default();
        }
    };
    let file: PackFile = match serde_json::from_str(&contents) {
        Ok(file) => file,
        Err(err) => {
            warn!("Failed to parse content pack {}: {err:#}", path.display());
            return PackSummary::default();
        }
    };

    let summary = apply_pack(&file, simulator, engine, path);
    info!(
        pack = %path.display(),
        ores = summary.ores + summary.zone_ores,
        loot_tables = summary.loot_tables,
        custom_drops = summary.custom_drops,
        injections = summary.injections,
        monster_loot = summary.monster_loot,
        skipped = summary.skipped,
        "Applied content pack"
    );
    summary
}

fn apply_pack(
    file: &PackFile,
    simulator: &VirtualMiningSimulator,
    engine: Option<&TableLootEngine>,
    source: &Path,
) -> PackSummary {
    let mut summary = PackSummary::default();
    let record = |result: Result<()>, counter: &mut usize, skipped: &mut usize| match result {
        Ok(()) => *counter += 1,
        Err(err) => {
            warn!("Skipping entry in content pack {}: {err:#}", source.display());
            *skipped += 1;
        }
    };

    for def in &file.ores {
        let result = parse_ore(def).map(|entry| simulator.ore_registry().register_universal_ore(entry));
        record(result, &mut summary.ores, &mut summary.skipped);
    }
    for def in &file.zone_ores {
        record(apply_zone_ore(def, simulator), &mut summary.zone_ores, &mut summary.skipped);
    }
    for def in &file.loot_tables {
        record(
            apply_loot_table(def, simulator, engine),
            &mut summary.loot_tables,
            &mut summary.skipped,
        );
    }
    for def in &file.custom_drops {
        record(apply_custom_drop(def, simulator), &mut summary.custom_drops, &mut summary.skipped);
    }
    for def in &file.injections {
        record(apply_injection(def, simulator), &mut summary.injections, &mut summary.skipped);
    }
    for def in &file.monster_loot {
        record(apply_monster_loot(def, simulator), &mut summary.monster_loot, &mut summary.skipped);
    }

    summary
}

fn apply_zone_ore(def: &PackZoneOreDefinition, simulator: &VirtualMiningSimulator) -> Result<()> {
    let zone = ZoneId::parse(&def.zone).with_context(|| format!("Invalid zone '{}'", def.zone))?;
    let entry = parse_ore(&def.ore)?;
    simulator.ore_registry().register_zone_ore(zone, entry);
    Ok(())
}

fn apply_loot_table(
    def: &PackLootTableDefinition,
    simulator: &VirtualMiningSimulator,
    engine: Option<&TableLootEngine>,
) -> Result<()> {
    let id = parse_key(&def.id)?;
    if let Some(table) = &def.table {
        let engine = engine.with_context(|| {
            format!("Loot table '{}' has a definition but no table engine is loaded", def.id)
        })?;
        table
            .validate(&id)
            .with_context(|| format!("Invalid definition for loot table '{}'", def.id))?;
        engine.define(id.clone(), table.clone());
    }
    simulator.loot_tables().register_loot_table(id, def.weight);
    Ok(())
}

fn apply_custom_drop(def: &PackCustomDrop, simulator: &VirtualMiningSimulator) -> Result<()> {
    if !def.chance.is_finite() || def.chance <= 0.0 || def.chance > 1.0 {
        anyhow::bail!("Custom drop '{}' chance must be in (0, 1]", def.item);
    }
    let stack = parse_stack(&def.item, def.count)?;
    simulator.loot_tables().add_custom_drop(stack, def.chance);
    Ok(())
}

fn apply_injection(def: &PackInjection, simulator: &VirtualMiningSimulator) -> Result<()> {
    let target = parse_key(&def.table)?;
    let stack = parse_stack(&def.item, def.count)?;
    simulator
        .loot_tables()
        .inject_item_drop(target, &stack, def.weight);
    Ok(())
}

fn apply_monster_loot(def: &PackMonsterLoot, simulator: &VirtualMiningSimulator) -> Result<()> {
    let monster = parse_key(&def.monster)?;
    let table = parse_key(&def.table)?;
    simulator.mob_drops().register_loot_table(monster, table);
    Ok(())
}

fn parse_key(token: &str) -> Result<RegistryKey> {
    RegistryKey::parse(token).with_context(|| format!("Invalid registry key '{token}'"))
}

/// `namespace:path` with an optional `@variant` suffix.
fn parse_resource(token: &str) -> Result<ResourceType> {
    let token = token.trim();
    match token.rsplit_once('@') {
        Some((key, variant)) => {
            let variant = variant
                .parse::<u16>()
                .with_context(|| format!("Invalid variant in '{token}'"))?;
            Ok(ResourceType::with_variant(parse_key(key)?, variant))
        }
        None => Ok(ResourceType::new(parse_key(token)?)),
    }
}

fn parse_stack(token: &str, count: u32) -> Result<ResourceStack> {
    if count == 0 {
        anyhow::bail!("Item '{token}' count must be positive");
    }
    Ok(parse_resource(token)?.to_stack(count))
}

fn parse_ore(def: &PackOreDefinition) -> Result<OreEntry> {
    let resource = parse_resource(&def.block)
        .with_context(|| format!("Invalid ore block '{}'", def.block))?;
    if def.min_depth > def.max_depth {
        anyhow::bail!(
            "Ore '{}' has min_depth {} > max_depth {}",
            def.block,
            def.min_depth,
            def.max_depth
        );
    }
    if def.weight == 0 {
        anyhow::bail!("Ore '{}' weight must be positive", def.block);
    }
    Ok(OreEntry::new(
        resource,
        def.vein_size,
        def.min_depth,
        def.max_depth,
        def.weight,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarrysim_sim::vanilla::vanilla_collaborators;
    use quarrysim_sim::{Collaborators, SimulationConfig};
    use std::sync::Arc;

    fn simulator_with_engine() -> (VirtualMiningSimulator, Arc<TableLootEngine>) {
        let engine = Arc::new(TableLootEngine::with_vanilla_tables());
        let collaborators = Collaborators {
            loot: engine.clone(),
            ..vanilla_collaborators()
        };
        (
            VirtualMiningSimulator::new(SimulationConfig::default(), collaborators),
            engine,
        )
    }

    fn apply(json: &str, simulator: &VirtualMiningSimulator, engine: &TableLootEngine) -> PackSummary {
        let file: PackFile = serde_json::from_str(json).unwrap();
        apply_pack(&file, simulator, Some(engine), Path::new("test.json"))
    }

    #[test]
    fn applies_every_section() {
        let (simulator, engine) = simulator_with_engine();
        let json = r#"{
            "ores": [{ "block": "othermod:tin_ore", "weight": 10 }],
            "zone_ores": [{ "zone": "hell", "block": "othermod:cobalt_ore@2", "max_depth": 128, "weight": 4 }],
            "loot_tables": [{
                "id": "quarrysim:quarry/tin",
                "weight": 3,
                "table": { "pools": [{ "name": "main", "rolls": { "min": 1, "max": 1 },
                    "entries": [{ "item": { "key": "othermod:tin_ingot" }, "weight": 1 }] }] }
            }],
            "custom_drops": [{ "item": "minecraft:dye@4", "count": 2, "chance": 0.05 }],
            "injections": [{ "table": "minecraft:chests/simple_dungeon", "item": "othermod:tin_ingot", "count": 3, "weight": 5 }],
            "monster_loot": [{ "monster": "othermod:ghoul", "table": "minecraft:entities/zombie" }]
        }"#;

        let summary = apply(json, &simulator, &engine);
        assert_eq!(
            summary,
            PackSummary {
                ores: 1,
                zone_ores: 1,
                loot_tables: 1,
                custom_drops: 1,
                injections: 1,
                monster_loot: 1,
                skipped: 0,
            }
        );

        let tin = RegistryKey::parse("othermod:tin_ore").unwrap();
        assert!(simulator
            .ore_registry()
            .entries_for_zone(&ZoneId::vanilla("plains"))
            .iter()
            .any(|e| e.resource.key == tin));
        let hell = simulator.ore_registry().entries_for_zone(&ZoneId::vanilla("hell"));
        assert!(hell.iter().any(|e| e.resource.variant == 2));

        let table = RegistryKey::quarry("quarry/tin");
        assert!(engine.is_defined(&table));
        assert_eq!(simulator.loot_tables().loot_table_weight(&table), 3);
        assert_eq!(simulator.loot_tables().custom_drops().len(), 1);
        assert_eq!(
            simulator
                .loot_tables()
                .injections_for(&RegistryKey::vanilla("chests/simple_dungeon"))
                .len(),
            1
        );
        assert_eq!(
            simulator
                .mob_drops()
                .loot_table_for(&RegistryKey::parse("othermod:ghoul").unwrap()),
            RegistryKey::vanilla("entities/zombie")
        );
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let (simulator, engine) = simulator_with_engine();
        let json = r#"{
            "ores": [
                { "block": "Bad Key!", "weight": 10 },
                { "block": "othermod:tin_ore", "min_depth": 90, "max_depth": 10, "weight": 1 },
                { "block": "othermod:zinc_ore", "weight": 0 },
                { "block": "othermod:lead_ore", "weight": 2 }
            ],
            "custom_drops": [{ "item": "minecraft:diamond", "chance": 1.5 }],
            "injections": [{ "table": "", "item": "minecraft:diamond" }]
        }"#;

        let summary = apply(json, &simulator, &engine);
        assert_eq!(summary.ores, 1);
        assert_eq!(summary.skipped, 5);
        assert!(simulator.loot_tables().custom_drops().is_empty());
    }

    #[test]
    fn custom_drop_chance_excludes_zero() {
        let (simulator, engine) = simulator_with_engine();
        let json = r#"{
            "custom_drops": [
                { "item": "minecraft:diamond", "chance": 0.0 },
                { "item": "minecraft:emerald", "chance": -0.5 },
                { "item": "minecraft:coal", "chance": 1.0 }
            ]
        }"#;

        let summary = apply(json, &simulator, &engine);
        assert_eq!(summary.custom_drops, 1);
        assert_eq!(summary.skipped, 2);
        let drops = simulator.loot_tables().custom_drops();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].stack.item, RegistryKey::vanilla("coal"));
    }

    #[test]
    fn definitions_need_a_table_engine() {
        let (simulator, _engine) = simulator_with_engine();
        let file: PackFile = serde_json::from_str(
            r#"{ "loot_tables": [
                { "id": "quarrysim:quarry/tin", "weight": 3, "table": { "pools": [] } },
                { "id": "minecraft:chests/igloo_chest", "weight": 2 }
            ] }"#,
        )
        .unwrap();
        let summary = apply_pack(&file, &simulator, None, Path::new("test.json"));
        assert_eq!(summary.loot_tables, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            simulator
                .loot_tables()
                .loot_table_weight(&RegistryKey::vanilla("chests/igloo_chest")),
            2
        );
    }

    #[test]
    fn unreadable_pack_is_ignored() {
        let (simulator, engine) = simulator_with_engine();
        let summary = load_content_pack(
            Path::new("does/not/exist/pack.json"),
            &simulator,
            Some(engine.as_ref()),
        );
        assert_eq!(summary, PackSummary::default());
    }

    #[test]
    fn parses_variants() {
        assert_eq!(
            parse_resource("minecraft:dye@4").unwrap(),
            ResourceType::with_variant(RegistryKey::vanilla("dye"), 4)
        );
        assert_eq!(parse_resource("coal").unwrap(), ResourceType::vanilla("coal"));
        assert!(parse_resource("minecraft:dye@x").is_err());
    }
}
