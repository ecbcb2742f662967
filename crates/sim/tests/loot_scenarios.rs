//! Loot catalog scenarios: weighted table choice, injections and custom drops
//! through the full simulator.

use std::sync::Arc;

use quarrysim_core::{Catalyst, ModifierType, RegistryKey, ResourceStack};
use quarrysim_sim::vanilla::{VanillaEnvironment, VanillaItemCatalog};
use quarrysim_sim::{
    Collaborators, LootContext, LootEngine, LootTableManager, SimulationConfig, SimulationMode,
    TableLootEngine, VirtualMiningSimulator, ZoneId, MAIN_POOL,
};
use quarrysim_testkit::{seeded_rng, FixedLootEngine};

fn simulator_with_engine(engine: Arc<dyn LootEngine>) -> VirtualMiningSimulator {
    VirtualMiningSimulator::new(
        SimulationConfig::default(),
        Collaborators {
            environment: Arc::new(VanillaEnvironment::new()),
            items: Arc::new(VanillaItemCatalog::new()),
            loot: engine,
        },
    )
}

#[test]
fn three_to_one_tables_split_draws_accordingly() {
    let manager = LootTableManager::empty();
    let a = RegistryKey::quarry("scenario/a");
    let b = RegistryKey::quarry("scenario/b");
    manager.register_loot_table(a.clone(), 3);
    manager.register_loot_table(b.clone(), 1);

    let mut rng = seeded_rng(2024);
    let draws = 10_000;
    let mut hits_a = 0u32;
    for _ in 0..draws {
        match manager.select_loot_table(&mut rng) {
            Some(id) if id == a => hits_a += 1,
            Some(id) => assert_eq!(id, b),
            None => panic!("non-empty catalog must select"),
        }
    }
    let share = f64::from(hits_a) / f64::from(draws);
    assert!((share - 0.75).abs() < 0.02, "share of a: {share}");
}

#[test]
fn simulator_loot_mode_counts_generations_and_uses_the_engine() {
    let engine = FixedLootEngine::default()
        .with_table(RegistryKey::quarry("scenario/a"), vec![ResourceStack::vanilla("emerald", 2)]);
    let sim = simulator_with_engine(Arc::new(engine));
    for (id, _) in sim.loot_tables().registered_loot_tables() {
        sim.loot_tables().remove_loot_table(&id);
    }
    sim.loot_tables().register_loot_table(RegistryKey::quarry("scenario/a"), 1);

    let mut rng = seeded_rng(5);
    let zone = ZoneId::vanilla("plains");
    let luck = Catalyst::empty().with(ModifierType::Luck, 2);
    for _ in 0..10 {
        let out = sim.simulate(SimulationMode::LootTable, &zone, &luck, &mut rng);
        assert_eq!(out, vec![ResourceStack::vanilla("emerald", 2)]);
    }
    assert_eq!(sim.statistics().loot_generations(), 10);
    assert_eq!(sim.statistics().blocks_mined(), 0);

    sim.reset_statistics();
    assert_eq!(sim.statistics().loot_generations(), 0);
}

#[test]
fn engine_failures_only_lose_the_table_draw() {
    let sim = simulator_with_engine(Arc::new(FixedLootEngine::default()));
    sim.loot_tables()
        .add_custom_drop(ResourceStack::vanilla("experience_bottle", 1), 1.0);

    let mut rng = seeded_rng(6);
    let out = sim.simulate(
        SimulationMode::LootTable,
        &ZoneId::vanilla("plains"),
        &Catalyst::empty(),
        &mut rng,
    );
    assert_eq!(out, vec![ResourceStack::vanilla("experience_bottle", 1)]);
}

#[test]
fn custom_drop_frequency_follows_chance() {
    let manager = LootTableManager::empty();
    manager.add_custom_drop(ResourceStack::vanilla("nether_star", 1), 0.1);
    let engine = FixedLootEngine::default();

    let mut rng = seeded_rng(11);
    let hits: usize = (0..10_000)
        .map(|_| manager.generate_loot(&engine, 0.0, &mut rng).len())
        .sum();
    let rate = hits as f64 / 10_000.0;
    assert!((rate - 0.1).abs() < 0.015, "rate {rate}");
}

/// Injections are appended every time the engine (re)loads a table, without
/// deduplication, so repeated in-place reloads stack duplicates.
#[test]
fn repeated_reloads_duplicate_injected_entries() {
    let engine = Arc::new(TableLootEngine::with_vanilla_tables());
    let sim = simulator_with_engine(engine.clone());
    let common = RegistryKey::quarry("quarry/common");
    sim.loot_tables()
        .inject_item_drop(common.clone(), &ResourceStack::vanilla("nether_star", 1), 5);

    let mut rng = seeded_rng(12);
    engine
        .generate(&common, 0.0, &LootContext::default(), &mut rng)
        .expect("vanilla table loads");
    let injected = |engine: &TableLootEngine| {
        engine
            .loaded_table(&common)
            .and_then(|table| table.pool(MAIN_POOL).cloned())
            .map(|pool| {
                pool.entries
                    .iter()
                    .filter(|e| e.item.as_ref().map(|i| i.key.path()) == Some("nether_star"))
                    .count()
            })
            .unwrap_or(0)
    };
    assert_eq!(injected(engine.as_ref()), 1);

    engine.reload();
    engine.reload();
    assert_eq!(injected(engine.as_ref()), 3);

    engine.reload_from_source();
    engine
        .generate(&common, 0.0, &LootContext::default(), &mut rng)
        .expect("vanilla table reloads");
    assert_eq!(injected(engine.as_ref()), 1);
}

#[test]
fn vanilla_catalog_only_draws_defined_tables() {
    let engine = Arc::new(TableLootEngine::with_vanilla_tables());
    let sim = simulator_with_engine(engine.clone());
    for (id, weight) in sim.loot_tables().registered_loot_tables() {
        assert!(weight > 0);
        assert!(engine.is_defined(&id), "{id} has no definition");
    }
}
