//! Namespaced registry keys.
//!
//! Registry keys are stable string identifiers for items, blocks, zones,
//! monsters and loot tables (e.g., `minecraft:coal_ore`). They are ordered and
//! validated so tables built from them iterate deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Namespace owned by the quarry simulation itself (custom loot tiers etc.).
pub const QUARRY_NAMESPACE: &str = "quarrysim";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryKeyError {
    message: String,
}

impl RegistryKeyError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RegistryKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RegistryKeyError {}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse a registry key.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::new("RegistryKey cannot be empty"));
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns, p),
            None => (default_namespace, input),
        };

        Self::new(namespace, path)
    }

    /// Build a key from explicit parts, validating both.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryKeyError> {
        let namespace = namespace.trim();
        let path = path.trim();

        validate_namespace(namespace)?;
        validate_path(path)?;

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Key in the [`DEFAULT_NAMESPACE`] for built-in tables.
    ///
    /// Built-in paths are compile-time constants; validity is only asserted in
    /// debug builds.
    pub fn vanilla(path: &str) -> Self {
        Self::from_parts_unchecked(DEFAULT_NAMESPACE, path)
    }

    /// Key in the [`QUARRY_NAMESPACE`].
    pub fn quarry(path: &str) -> Self {
        Self::from_parts_unchecked(QUARRY_NAMESPACE, path)
    }

    fn from_parts_unchecked(namespace: &str, path: &str) -> Self {
        debug_assert!(validate_namespace(namespace).is_ok(), "bad namespace {namespace}");
        debug_assert!(validate_path(path).is_ok(), "bad path {path}");
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same namespace, path prefixed with `prefix/` (e.g. `entities/zombie`).
    pub fn with_path_prefix(&self, prefix: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            path: format!("{prefix}/{}", self.path),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), RegistryKeyError> {
    if ns.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey namespace cannot be empty"));
    }
    if ns.len() > 64 {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace too long (max 64)",
        ));
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace has invalid characters (allowed: a-z0-9_.-)",
        ));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), RegistryKeyError> {
    if path.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey path cannot be empty"));
    }
    if path.len() > 128 {
        return Err(RegistryKeyError::new("RegistryKey path too long (max 128)"));
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey path has invalid characters (allowed: a-z0-9_./-)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("quarrysim:quarry/rare").unwrap();
        assert_eq!(key.namespace(), "quarrysim");
        assert_eq!(key.path(), "quarry/rare");
        assert_eq!(key.to_string(), "quarrysim:quarry/rare");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("coal_ore").unwrap();
        assert_eq!(key.to_string(), "minecraft:coal_ore");
        assert_eq!(key, RegistryKey::vanilla("coal_ore"));
    }

    #[test]
    fn rejects_empty() {
        assert!(RegistryKey::parse("").is_err());
        assert!(RegistryKey::parse("   ").is_err());
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(RegistryKey::parse("minecraft:Stone").is_err());
        assert!(RegistryKey::parse("MC:stone").is_err());
        assert!(RegistryKey::parse("minecraft:stone?").is_err());
        assert!(RegistryKey::parse("minecraft:").is_err());
        assert!(RegistryKey::parse(":stone").is_err());
    }

    #[test]
    fn path_prefix_keeps_namespace() {
        let zombie = RegistryKey::parse("othermod:bog_zombie").unwrap();
        assert_eq!(
            zombie.with_path_prefix("entities").to_string(),
            "othermod:entities/bog_zombie"
        );
    }

    #[test]
    fn serde_uses_string_form() {
        let key = RegistryKey::vanilla("chests/igloo_chest");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"minecraft:chests/igloo_chest\"");
        let back: RegistryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<RegistryKey>("\"Bad Key\"").is_err());
    }
}
