use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use quarrysim_core::{RegistryKey, ResourceStack, ResourceType};
use rand::{Rng, RngCore};

use crate::catalog::{CatalogError, ItemCatalog};

/// How a block's yield reacts to fortune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FortuneRule {
    /// Fortune does nothing.
    None,
    /// Count multiplied by `max(1, rand(fortune + 2))`.
    Multiplier,
    /// Count increased by `rand(fortune + 1)`.
    Additive,
}

/// What mining a block yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropRule {
    /// The block itself, variant preserved.
    Itself,
    /// A different item in a count range.
    Item {
        item: ResourceType,
        min: u32,
        max: u32,
        fortune: FortuneRule,
    },
    /// The default variant drops `item`; other variants drop themselves.
    DefaultVariantAs(ResourceType),
    /// Itself, or flint with a fortune-improved chance.
    Flint,
}

impl DropRule {
    fn item(path: &str, min: u32, max: u32, fortune: FortuneRule) -> Self {
        DropRule::Item {
            item: ResourceType::vanilla(path),
            min,
            max,
            fortune,
        }
    }

    fn roll(&self, resource: &ResourceType, fortune: u32, rng: &mut dyn RngCore) -> Vec<ResourceStack> {
        match self {
            DropRule::Itself => vec![resource.to_stack(1)],
            DropRule::DefaultVariantAs(item) if resource.variant == 0 => vec![item.to_stack(1)],
            DropRule::DefaultVariantAs(_) => vec![resource.to_stack(1)],
            DropRule::Flint => {
                let flint = fortune > 3 || rng.gen_range(0..10 - fortune * 3) == 0;
                if flint {
                    vec![ResourceStack::vanilla("flint", 1)]
                } else {
                    vec![resource.to_stack(1)]
                }
            }
            DropRule::Item {
                item,
                min,
                max,
                fortune: rule,
            } => {
                let mut count = if min >= max { *min } else { rng.gen_range(*min..=*max) };
                if fortune > 0 {
                    match rule {
                        FortuneRule::None => {}
                        FortuneRule::Multiplier => {
                            let bonus = rng.gen_range(0..fortune.saturating_add(2)).saturating_sub(1);
                            count = count.saturating_mul(bonus.saturating_add(1));
                        }
                        FortuneRule::Additive => count = count.saturating_add(rng.gen_range(0..=fortune)),
                    }
                }
                vec![item.to_stack(count)]
            }
        }
    }
}

/// Item/block knowledge for the vanilla ore set. Modded blocks and tags can
/// be registered at runtime.
pub struct VanillaItemCatalog {
    blocks: RwLock<HashMap<RegistryKey, DropRule>>,
    dictionary: RwLock<Vec<(String, Vec<ResourceType>)>>,
}

impl Default for VanillaItemCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl VanillaItemCatalog {
    pub fn new() -> Self {
        use FortuneRule::{Additive, Multiplier};

        let blocks: HashMap<RegistryKey, DropRule> = [
            ("coal_ore", DropRule::item("coal", 1, 1, Multiplier)),
            ("iron_ore", DropRule::Itself),
            ("gold_ore", DropRule::Itself),
            ("redstone_ore", DropRule::item("redstone", 4, 5, Additive)),
            ("lit_redstone_ore", DropRule::item("redstone", 4, 5, Additive)),
            ("diamond_ore", DropRule::item("diamond", 1, 1, Multiplier)),
            (
                "lapis_ore",
                DropRule::Item {
                    item: ResourceType::with_variant(RegistryKey::vanilla("dye"), 4),
                    min: 4,
                    max: 8,
                    fortune: Multiplier,
                },
            ),
            ("emerald_ore", DropRule::item("emerald", 1, 1, Multiplier)),
            ("quartz_ore", DropRule::item("quartz", 1, 1, Multiplier)),
            ("stone", DropRule::DefaultVariantAs(ResourceType::vanilla("cobblestone"))),
            ("cobblestone", DropRule::Itself),
            ("dirt", DropRule::Itself),
            ("gravel", DropRule::Flint),
            ("magma", DropRule::Itself),
            ("netherrack", DropRule::Itself),
        ]
        .into_iter()
        .map(|(path, rule)| (RegistryKey::vanilla(path), rule))
        .collect();

        let stone = |variant| ResourceType::with_variant(RegistryKey::vanilla("stone"), variant);
        let dye = ResourceType::with_variant(RegistryKey::vanilla("dye"), 4);
        let dictionary = vec![
            ("oreCoal", vec![ResourceType::vanilla("coal_ore")]),
            ("oreIron", vec![ResourceType::vanilla("iron_ore")]),
            ("oreGold", vec![ResourceType::vanilla("gold_ore")]),
            ("oreRedstone", vec![ResourceType::vanilla("redstone_ore")]),
            ("oreDiamond", vec![ResourceType::vanilla("diamond_ore")]),
            ("oreLapis", vec![ResourceType::vanilla("lapis_ore")]),
            ("oreEmerald", vec![ResourceType::vanilla("emerald_ore")]),
            ("oreQuartz", vec![ResourceType::vanilla("quartz_ore")]),
            ("stone", vec![stone(0), stone(1), stone(3), stone(5)]),
            ("stoneGranite", vec![stone(1)]),
            ("stoneDiorite", vec![stone(3)]),
            ("stoneAndesite", vec![stone(5)]),
            ("cobblestone", vec![ResourceType::vanilla("cobblestone")]),
            ("dirt", vec![ResourceType::vanilla("dirt")]),
            ("gravel", vec![ResourceType::vanilla("gravel")]),
            ("gemDiamond", vec![ResourceType::vanilla("diamond")]),
            ("gemEmerald", vec![ResourceType::vanilla("emerald")]),
            ("gemLapis", vec![dye]),
            ("gemQuartz", vec![ResourceType::vanilla("quartz")]),
            ("dustRedstone", vec![ResourceType::vanilla("redstone")]),
        ]
        .into_iter()
        .map(|(tag, members)| (tag.to_string(), members))
        .collect();

        Self {
            blocks: RwLock::new(blocks),
            dictionary: RwLock::new(dictionary),
        }
    }

    /// Add or replace a block and its drop rule.
    pub fn register_block(&self, key: RegistryKey, rule: DropRule) {
        self.blocks.write().insert(key, rule);
    }

    /// Attach a dictionary tag to `resource`; tags keep registration order.
    pub fn register_tag(&self, tag: &str, resource: ResourceType) {
        let mut dictionary = self.dictionary.write();
        match dictionary.iter_mut().find(|(name, _)| name == tag) {
            Some((_, members)) => {
                if !members.contains(&resource) {
                    members.push(resource);
                }
            }
            None => dictionary.push((tag.to_string(), vec![resource])),
        }
    }

    /// Keys of every known block, sorted.
    pub fn block_keys(&self) -> BTreeSet<RegistryKey> {
        self.blocks.read().keys().cloned().collect()
    }
}

impl ItemCatalog for VanillaItemCatalog {
    fn natural_drops(
        &self,
        resource: &ResourceType,
        fortune: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ResourceStack>, CatalogError> {
        let rule = self
            .blocks
            .read()
            .get(&resource.key)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownType(resource.clone()))?;
        Ok(rule.roll(resource, fortune, rng))
    }

    fn dictionary_tags(&self, resource: &ResourceType) -> Vec<String> {
        self.dictionary
            .read()
            .iter()
            .filter(|(_, members)| members.contains(resource))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn dictionary_entries(&self) -> Vec<(String, Vec<ResourceType>)> {
        self.dictionary.read().clone()
    }

    fn is_block(&self, resource: &ResourceType) -> bool {
        self.blocks.read().contains_key(&resource.key)
    }
}
