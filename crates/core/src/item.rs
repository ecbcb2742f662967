//! Resource types and stacks - the unit of simulated output.

use crate::components::ComponentMap;
use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete block/item type: registry key plus metadata variant.
///
/// Variants distinguish e.g. granite (`minecraft:stone` variant 1) from plain
/// stone (variant 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceType {
    /// Registry key of the block or item.
    pub key: RegistryKey,
    /// Metadata variant (0 for the default state).
    #[serde(default)]
    pub variant: u16,
}

impl ResourceType {
    /// Default-variant type.
    pub fn new(key: RegistryKey) -> Self {
        Self { key, variant: 0 }
    }

    /// Type with an explicit variant.
    pub fn with_variant(key: RegistryKey, variant: u16) -> Self {
        Self { key, variant }
    }

    /// Shorthand for a vanilla default-variant type.
    pub fn vanilla(path: &str) -> Self {
        Self::new(RegistryKey::vanilla(path))
    }

    /// One-item stack of this exact type (silk-touch style drop).
    pub fn to_stack(&self, count: u32) -> ResourceStack {
        ResourceStack::with_variant(self.key.clone(), self.variant, count)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variant == 0 {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}@{}", self.key, self.variant)
        }
    }
}

/// Generated output: item type, count, optional auxiliary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStack {
    /// Item registry key.
    pub item: RegistryKey,
    /// Metadata variant.
    #[serde(default)]
    pub variant: u16,
    /// Quantity in the stack.
    pub count: u32,
    /// Auxiliary tag data; `None` and an empty map are treated alike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<ComponentMap>,
}

/// Composite identity used to consolidate stacks: `(item, variant, tag)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackKey {
    item: RegistryKey,
    variant: u16,
    tag: Option<ComponentMap>,
}

impl ResourceStack {
    /// Default-variant stack with no tag data.
    pub fn new(item: RegistryKey, count: u32) -> Self {
        Self::with_variant(item, 0, count)
    }

    /// Stack with an explicit variant.
    pub fn with_variant(item: RegistryKey, variant: u16, count: u32) -> Self {
        Self {
            item,
            variant,
            count,
            tag: None,
        }
    }

    /// Shorthand for a vanilla item.
    pub fn vanilla(path: &str, count: u32) -> Self {
        Self::new(RegistryKey::vanilla(path), count)
    }

    /// Attach tag data.
    pub fn with_tag(mut self, tag: ComponentMap) -> Self {
        self.tag = if tag.is_empty() { None } else { Some(tag) };
        self
    }

    /// True when the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Increase the count, saturating.
    pub fn grow(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount);
    }

    /// The type this stack holds.
    pub fn resource_type(&self) -> ResourceType {
        ResourceType::with_variant(self.item.clone(), self.variant)
    }

    /// Merge identity of this stack.
    pub fn merge_key(&self) -> StackKey {
        StackKey {
            item: self.item.clone(),
            variant: self.variant,
            tag: self.tag.clone().filter(|t| !t.is_empty()),
        }
    }
}

impl fmt::Display for ResourceStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.count, self.resource_type())
    }
}
