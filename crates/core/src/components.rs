//! Auxiliary stack data ("tag data").
//!
//! Generated stacks may carry structured metadata (an enchanted book's stored
//! enchantments, a named trophy, ...). Two stacks only merge when their
//! component maps are equal, so the representation is ordered and hashable.

use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deterministic component map keyed by [`RegistryKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentMap {
    components: BTreeMap<RegistryKey, ComponentValue>,
}

impl ComponentMap {
    /// Create an empty component map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a component value.
    pub fn insert(&mut self, key: RegistryKey, value: ComponentValue) -> Option<ComponentValue> {
        self.components.insert(key, value)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: RegistryKey, value: ComponentValue) -> Self {
        self.components.insert(key, value);
        self
    }

    /// Get a component value.
    pub fn get(&self, key: &RegistryKey) -> Option<&ComponentValue> {
        self.components.get(key)
    }

    /// Iterate over components in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegistryKey, &ComponentValue)> {
        self.components.iter()
    }

    /// Returns true if the map contains no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }
}

/// Deterministic component value.
///
/// Floats are omitted so values stay `Eq + Hash` and stacks merge by exact
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ComponentValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    I64(i64),
    /// UTF-8 string value.
    String(String),
    /// Ordered list of values.
    List(Vec<ComponentValue>),
    /// Ordered map of values (string keys).
    Map(BTreeMap<String, ComponentValue>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_map_orders_keys() {
        let map = ComponentMap::new()
            .with(RegistryKey::quarry("b"), ComponentValue::Bool(true))
            .with(RegistryKey::quarry("a"), ComponentValue::Bool(false));

        let keys: Vec<_> = map.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["quarrysim:a".to_string(), "quarrysim:b".to_string()]
        );
    }

    #[test]
    fn equal_maps_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = ComponentMap::new().with(RegistryKey::quarry("x"), ComponentValue::I64(3));
        let b = ComponentMap::new().with(RegistryKey::quarry("x"), ComponentValue::I64(3));
        let hash = |m: &ComponentMap| {
            let mut h = DefaultHasher::new();
            m.hash(&mut h);
            h.finish()
        };
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }
}
