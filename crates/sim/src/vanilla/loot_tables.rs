use quarrysim_core::{RegistryKey, ResourceType};

use crate::loot::{LootPool, LootTable, PoolEntry, UniformRange, MAIN_POOL};
use crate::monster::MonsterKind;

fn item(path: &str, weight: u32, min: u32, max: u32) -> PoolEntry {
    PoolEntry::item(ResourceType::vanilla(path), weight, UniformRange::new(min, max))
}

fn variant(path: &str, variant: u16, weight: u32, min: u32, max: u32) -> PoolEntry {
    PoolEntry::item(
        ResourceType::with_variant(RegistryKey::vanilla(path), variant),
        weight,
        UniformRange::new(min, max),
    )
}

fn main_pool(min_rolls: u32, max_rolls: u32, entries: Vec<PoolEntry>) -> LootPool {
    LootPool::new(MAIN_POOL, UniformRange::new(min_rolls, max_rolls), entries)
}

fn single(entries: Vec<PoolEntry>) -> LootTable {
    LootTable::new(vec![main_pool(1, 1, entries)])
}

/// One guaranteed roll of `drop`, plus a rare pool that luck improves.
fn with_rare(drop: PoolEntry, rare: Vec<PoolEntry>) -> LootTable {
    let mut rare_entries = vec![PoolEntry::empty(40).with_quality(-1)];
    rare_entries.extend(rare);
    LootTable::new(vec![
        main_pool(1, 1, vec![drop]),
        LootPool::new("rare", UniformRange::exactly(1), rare_entries),
    ])
}

fn chest_tables() -> Vec<(&'static str, LootTable)> {
    let dungeon = LootTable::new(vec![
        main_pool(
            1,
            3,
            vec![
                item("saddle", 20, 1, 1),
                item("golden_apple", 15, 1, 1),
                variant("golden_apple", 1, 2, 1, 1),
                item("record_13", 15, 1, 1),
                item("record_cat", 15, 1, 1),
                item("name_tag", 20, 1, 1),
                item("golden_horse_armor", 10, 1, 1),
                item("iron_horse_armor", 15, 1, 1),
                item("diamond_horse_armor", 5, 1, 1).with_quality(2),
            ],
        ),
        LootPool::new(
            "filler",
            UniformRange::new(1, 4),
            vec![
                item("iron_ingot", 10, 1, 4),
                item("gold_ingot", 5, 1, 4),
                item("bread", 20, 1, 1),
                item("wheat", 20, 1, 4),
                item("bucket", 10, 1, 1),
                item("redstone", 15, 1, 4),
                item("coal", 15, 1, 4),
            ],
        ),
    ]);

    vec![
        ("chests/simple_dungeon", dungeon),
        (
            "chests/village_blacksmith",
            LootTable::new(vec![main_pool(
                3,
                8,
                vec![
                    item("diamond", 3, 1, 3),
                    item("iron_ingot", 10, 1, 5),
                    item("gold_ingot", 5, 1, 3),
                    item("bread", 15, 1, 3),
                    item("apple", 15, 1, 3),
                    item("iron_pickaxe", 5, 1, 1),
                    item("iron_sword", 5, 1, 1),
                    item("obsidian", 5, 3, 7),
                    item("sapling", 5, 3, 7),
                    item("iron_horse_armor", 1, 1, 1),
                ],
            )]),
        ),
        (
            "chests/abandoned_mineshaft",
            LootTable::new(vec![main_pool(
                2,
                4,
                vec![
                    item("golden_apple", 20, 1, 1),
                    variant("golden_apple", 1, 1, 1, 1),
                    item("name_tag", 30, 1, 1),
                    item("iron_pickaxe", 5, 1, 1),
                    item("iron_ingot", 10, 1, 5),
                    item("gold_ingot", 5, 1, 3),
                    item("redstone", 5, 4, 9),
                    variant("dye", 4, 5, 4, 9),
                    item("diamond", 3, 1, 2),
                    item("coal", 10, 3, 8),
                    item("bread", 15, 1, 3),
                    item("rail", 20, 4, 8),
                    item("torch", 15, 1, 16),
                ],
            )]),
        ),
        (
            "chests/desert_pyramid",
            LootTable::new(vec![main_pool(
                2,
                4,
                vec![
                    item("diamond", 5, 1, 3),
                    item("iron_ingot", 15, 1, 5),
                    item("gold_ingot", 15, 2, 7),
                    item("emerald", 15, 1, 3),
                    item("bone", 25, 4, 6),
                    item("spider_eye", 25, 1, 3),
                    item("rotten_flesh", 25, 3, 7),
                    item("saddle", 20, 1, 1),
                    item("golden_apple", 20, 1, 1),
                    variant("golden_apple", 1, 2, 1, 1),
                    PoolEntry::empty(15),
                ],
            )]),
        ),
        (
            "chests/jungle_temple",
            LootTable::new(vec![main_pool(
                2,
                6,
                vec![
                    item("diamond", 3, 1, 3),
                    item("iron_ingot", 10, 1, 5),
                    item("gold_ingot", 15, 2, 7),
                    item("emerald", 2, 1, 3),
                    item("bone", 20, 4, 6),
                    item("rotten_flesh", 16, 3, 7),
                    item("saddle", 3, 1, 1),
                ],
            )]),
        ),
        (
            "chests/igloo_chest",
            LootTable::new(vec![
                main_pool(
                    2,
                    8,
                    vec![
                        item("apple", 15, 1, 3),
                        item("coal", 15, 1, 4),
                        item("gold_nugget", 10, 1, 3),
                        item("stone_axe", 2, 1, 1),
                        item("rotten_flesh", 10, 1, 1),
                        item("emerald", 1, 1, 1),
                        item("wheat", 10, 2, 3),
                    ],
                ),
                LootPool::new(
                    "apple",
                    UniformRange::exactly(1),
                    vec![variant("golden_apple", 0, 1, 1, 1)],
                ),
            ]),
        ),
        (
            "chests/stronghold_corridor",
            LootTable::new(vec![main_pool(
                2,
                3,
                vec![
                    item("ender_pearl", 10, 1, 1),
                    item("diamond", 3, 1, 3),
                    item("iron_ingot", 10, 1, 5),
                    item("gold_ingot", 5, 1, 3),
                    item("redstone", 5, 4, 9),
                    item("bread", 15, 1, 3),
                    item("apple", 15, 1, 3),
                    item("iron_pickaxe", 5, 1, 1),
                    item("golden_apple", 1, 1, 1),
                ],
            )]),
        ),
        (
            "chests/stronghold_crossing",
            LootTable::new(vec![main_pool(
                1,
                4,
                vec![
                    item("iron_ingot", 10, 1, 5),
                    item("gold_ingot", 5, 1, 3),
                    item("redstone", 5, 4, 9),
                    item("coal", 10, 3, 8),
                    item("bread", 15, 1, 3),
                    item("apple", 15, 1, 3),
                    item("iron_pickaxe", 1, 1, 1),
                ],
            )]),
        ),
        (
            "chests/stronghold_library",
            LootTable::new(vec![main_pool(
                2,
                10,
                vec![
                    item("book", 20, 1, 3),
                    item("paper", 20, 2, 7),
                    item("map", 1, 1, 1),
                    item("compass", 1, 1, 1),
                    item("enchanted_book", 10, 1, 1).with_quality(1),
                ],
            )]),
        ),
        (
            "chests/woodland_mansion",
            LootTable::new(vec![main_pool(
                1,
                3,
                vec![
                    item("lead", 20, 1, 1),
                    item("golden_apple", 15, 1, 1),
                    variant("golden_apple", 1, 2, 1, 1),
                    item("record_13", 15, 1, 1),
                    item("name_tag", 20, 1, 1),
                    item("chainmail_chestplate", 10, 1, 1),
                    item("diamond_hoe", 15, 1, 1),
                    item("diamond_chestplate", 5, 1, 1).with_quality(2),
                ],
            )]),
        ),
        (
            "chests/end_city_treasure",
            LootTable::new(vec![main_pool(
                2,
                6,
                vec![
                    item("diamond", 5, 2, 7),
                    item("iron_ingot", 10, 4, 8),
                    item("gold_ingot", 15, 2, 7),
                    item("emerald", 2, 2, 6),
                    item("beetroot_seeds", 5, 1, 10),
                    item("saddle", 3, 1, 1),
                    item("diamond_sword", 3, 1, 1).with_quality(2),
                    item("diamond_pickaxe", 3, 1, 1).with_quality(2),
                ],
            )]),
        ),
        (
            "chests/nether_bridge",
            LootTable::new(vec![main_pool(
                2,
                4,
                vec![
                    item("diamond", 5, 1, 3),
                    item("iron_ingot", 5, 1, 5),
                    item("gold_ingot", 15, 1, 3),
                    item("golden_sword", 5, 1, 1),
                    item("golden_chestplate", 5, 1, 1),
                    item("flint_and_steel", 5, 1, 1),
                    item("nether_wart", 5, 3, 7),
                    item("saddle", 10, 1, 1),
                    item("golden_horse_armor", 8, 1, 1),
                    item("obsidian", 2, 2, 4),
                ],
            )]),
        ),
    ]
}

fn entity_table(kind: MonsterKind) -> LootTable {
    match kind {
        MonsterKind::Zombie | MonsterKind::Husk | MonsterKind::ZombieVillager => with_rare(
            item("rotten_flesh", 1, 0, 2),
            vec![item("iron_ingot", 1, 1, 1), item("carrot", 1, 1, 1), item("potato", 1, 1, 1)],
        ),
        MonsterKind::ZombiePigman => LootTable::new(vec![
            main_pool(1, 1, vec![item("rotten_flesh", 1, 0, 1)]),
            LootPool::new("nugget", UniformRange::exactly(1), vec![item("gold_nugget", 1, 0, 1)]),
            LootPool::new(
                "rare",
                UniformRange::exactly(1),
                vec![PoolEntry::empty(40).with_quality(-1), item("gold_ingot", 1, 1, 1)],
            ),
        ]),
        MonsterKind::Skeleton => LootTable::new(vec![
            main_pool(1, 1, vec![item("arrow", 1, 0, 2)]),
            LootPool::new("bones", UniformRange::exactly(1), vec![item("bone", 1, 0, 2)]),
        ]),
        MonsterKind::Stray => LootTable::new(vec![
            main_pool(1, 1, vec![item("arrow", 1, 0, 2)]),
            LootPool::new("bones", UniformRange::exactly(1), vec![item("bone", 1, 0, 2)]),
            LootPool::new("tipped", UniformRange::exactly(1), vec![item("tipped_arrow", 1, 0, 1)]),
        ]),
        MonsterKind::WitherSkeleton => LootTable::new(vec![
            main_pool(1, 1, vec![item("coal", 1, 0, 1)]),
            LootPool::new("bones", UniformRange::exactly(1), vec![item("bone", 1, 0, 2)]),
            LootPool::new(
                "rare",
                UniformRange::exactly(1),
                vec![PoolEntry::empty(40).with_quality(-1), variant("skull", 1, 1, 1, 1)],
            ),
        ]),
        MonsterKind::Creeper => single(vec![item("gunpowder", 1, 0, 2)]),
        MonsterKind::Spider | MonsterKind::CaveSpider => LootTable::new(vec![
            main_pool(1, 1, vec![item("string", 1, 0, 2)]),
            LootPool::new(
                "eyes",
                UniformRange::exactly(1),
                vec![PoolEntry::empty(2), item("spider_eye", 1, 1, 1)],
            ),
        ]),
        MonsterKind::Enderman => single(vec![item("ender_pearl", 1, 0, 1)]),
        MonsterKind::Witch => LootTable::new(vec![main_pool(
            1,
            3,
            vec![
                item("glowstone_dust", 1, 0, 2),
                item("sugar", 1, 0, 2),
                item("redstone", 1, 0, 2),
                item("spider_eye", 1, 0, 2),
                item("glass_bottle", 1, 0, 2),
                item("gunpowder", 1, 0, 2),
                item("stick", 2, 0, 2),
            ],
        )]),
        MonsterKind::Slime => single(vec![item("slime_ball", 1, 0, 2)]),
        MonsterKind::MagmaCube => single(vec![PoolEntry::empty(1), item("magma_cream", 1, 1, 1)]),
        MonsterKind::Blaze => single(vec![item("blaze_rod", 1, 0, 1)]),
        MonsterKind::Ghast => LootTable::new(vec![
            main_pool(1, 1, vec![item("ghast_tear", 1, 0, 1)]),
            LootPool::new("powder", UniformRange::exactly(1), vec![item("gunpowder", 1, 0, 2)]),
        ]),
        MonsterKind::Guardian => LootTable::new(vec![
            main_pool(1, 1, vec![item("prismarine_shard", 1, 0, 2)]),
            LootPool::new(
                "fish",
                UniformRange::exactly(1),
                vec![
                    item("fish", 2, 1, 1),
                    item("prismarine_crystals", 2, 1, 1),
                    PoolEntry::empty(1),
                ],
            ),
        ]),
        MonsterKind::Shulker => single(vec![PoolEntry::empty(1), item("shulker_shell", 1, 1, 1)]),
    }
}

fn quarry_tiers() -> Vec<(&'static str, LootTable)> {
    vec![
        (
            "quarry/common",
            LootTable::new(vec![main_pool(
                2,
                4,
                vec![
                    item("cobblestone", 30, 8, 32),
                    item("coal", 20, 2, 8),
                    item("iron_ingot", 12, 1, 4),
                    item("gold_ingot", 6, 1, 3),
                    item("redstone", 10, 2, 8),
                    item("flint", 10, 1, 4),
                    item("torch", 8, 4, 16),
                ],
            )]),
        ),
        (
            "quarry/rare",
            LootTable::new(vec![main_pool(
                1,
                3,
                vec![
                    item("diamond", 10, 1, 3).with_quality(1),
                    item("emerald", 10, 1, 4).with_quality(1),
                    item("ender_pearl", 8, 1, 2),
                    item("golden_apple", 6, 1, 1),
                    item("experience_bottle", 12, 2, 6),
                    item("obsidian", 10, 2, 8),
                ],
            )]),
        ),
        (
            "quarry/legendary",
            LootTable::new(vec![main_pool(
                1,
                1,
                vec![
                    item("nether_star", 5, 1, 1).with_quality(2),
                    item("elytra", 3, 1, 1).with_quality(2),
                    variant("golden_apple", 1, 10, 1, 2),
                    item("diamond_block", 10, 1, 2),
                    item("totem_of_undying", 4, 1, 1).with_quality(1),
                ],
            )]),
        ),
    ]
}

/// Definitions for every built-in table: the vanilla chests, an entity table
/// per known monster, and the three quarry tiers. Every table has a `main`
/// pool so injections have somewhere to go.
pub fn vanilla_loot_tables() -> Vec<(RegistryKey, LootTable)> {
    let mut tables: Vec<(RegistryKey, LootTable)> = chest_tables()
        .into_iter()
        .map(|(path, table)| (RegistryKey::vanilla(path), table))
        .collect();

    tables.extend(
        MonsterKind::ALL
            .into_iter()
            .map(|kind| (kind.key().with_path_prefix("entities"), entity_table(kind))),
    );

    tables.extend(
        quarry_tiers()
            .into_iter()
            .map(|(path, table)| (RegistryKey::quarry(path), table)),
    );
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_valid_and_has_a_main_pool() {
        for (id, table) in vanilla_loot_tables() {
            assert!(table.validate(&id).is_ok(), "{id} is malformed");
            assert!(table.pool(MAIN_POOL).is_some(), "{id} has no main pool");
        }
    }

    #[test]
    fn every_monster_has_an_entity_table() {
        let tables = vanilla_loot_tables();
        for kind in MonsterKind::ALL {
            let id = kind.key().with_path_prefix("entities");
            assert!(tables.iter().any(|(key, _)| *key == id), "missing {id}");
        }
    }
}
