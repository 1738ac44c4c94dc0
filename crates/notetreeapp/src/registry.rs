//! # Named Registries
//!
//! The notebook owns two name-keyed maps: images (filename → bytes) and page
//! templates (name → Markdown snippet). Both follow the same rules:
//!
//! - **Case-insensitive uniqueness**: `Photo.png` and `photo.PNG` cannot coexist.
//!   Inserting a name that collides ignoring case is rejected, not merged.
//! - **Exact keys are kept**: the name is stored as given, since image references in
//!   Markdown (`![alt](Photo.png)`) are plain filenames.
//! - **Display order** is by lowercased name.
//!
//! Images are persisted as base64 strings: [`ImageRegistry::encode`] writes that form and
//! [`ImageRegistry::decode`] reads it back.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crate::error::{NotebookError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored spelling of `name`, matched ignoring case.
    pub fn key_for(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.entries
            .keys()
            .find(|k| k.to_lowercase() == folded)
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.key_for(name).is_some()
    }

    /// Adds a new entry. Returns `false` if the name collides ignoring case.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> bool {
        let name = name.into();
        if name.trim().is_empty() || self.contains(&name) {
            return false;
        }
        self.entries.insert(name, value);
        true
    }

    /// Overwrites the value of an existing entry (matched ignoring case).
    pub fn replace(&mut self, name: &str, value: V) -> bool {
        let Some(key) = self.key_for(name).map(str::to_string) else {
            return false;
        };
        self.entries.insert(key, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.key_for(name).and_then(|key| self.entries.get(key))
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        let key = self.key_for(name)?.to_string();
        self.entries.remove(&key)
    }

    /// Renames an entry. Fails if `old` is missing or `new` collides with a different
    /// entry. Changing only the case of a name is allowed.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> bool {
        let new = new.into();
        let Some(old_key) = self.key_for(old).map(str::to_string) else {
            return false;
        };
        if new.trim().is_empty() {
            return false;
        }
        if let Some(existing) = self.key_for(&new) {
            if existing != old_key {
                return false;
            }
        }
        let Some(value) = self.entries.remove(&old_key) else {
            return false;
        };
        self.entries.insert(new, value);
        true
    }

    /// Names ordered by their lowercased form.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type TemplateRegistry = Registry<String>;

impl Serialize for Registry<String> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Registry<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        from_raw(raw).map_err(D::Error::custom)
    }
}

/// Image bytes keyed by filename; base64 strings on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRegistry(pub Registry<Vec<u8>>);

impl std::ops::Deref for ImageRegistry {
    type Target = Registry<Vec<u8>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for ImageRegistry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageRegistry {
    /// The on-disk form: filename → base64.
    pub fn encode(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(name, bytes)| (name.to_string(), STANDARD.encode(bytes)))
            .collect()
    }

    /// Rebuilds the registry from its on-disk form (filename → base64).
    pub fn decode(raw: BTreeMap<String, String>) -> Result<Self> {
        let mut decoded = BTreeMap::new();
        for (name, data) in raw {
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|source| NotebookError::Base64 {
                    name: name.clone(),
                    source,
                })?;
            decoded.insert(name, bytes);
        }
        from_raw(decoded)
            .map(ImageRegistry)
            .map_err(NotebookError::Store)
    }
}

fn from_raw<V>(raw: BTreeMap<String, V>) -> std::result::Result<Registry<V>, String> {
    let mut registry = Registry::new();
    for (name, value) in raw {
        if !registry.insert(name.clone(), value) {
            return Err(format!("duplicate entry '{}' (names are case-insensitive)", name));
        }
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_case_collision() {
        let mut reg = TemplateRegistry::new();
        assert!(reg.insert("Meeting", "# Agenda".to_string()));
        assert!(!reg.insert("meeting", "other".to_string()));
        assert!(!reg.insert("  ", "blank".to_string()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("MEETING").unwrap(), "# Agenda");
    }

    #[test]
    fn test_names_sorted_ignoring_case() {
        let mut reg = TemplateRegistry::new();
        reg.insert("beta", String::new());
        reg.insert("Alpha", String::new());
        reg.insert("Gamma", String::new());
        assert_eq!(reg.names(), vec!["Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_rename() {
        let mut reg = TemplateRegistry::new();
        reg.insert("one", "1".to_string());
        reg.insert("two", "2".to_string());
        assert!(!reg.rename("one", "TWO"));
        assert!(!reg.rename("missing", "three"));
        assert!(reg.rename("one", "One"));
        assert_eq!(reg.key_for("one"), Some("One"));
        assert!(reg.rename("One", "first"));
        assert_eq!(reg.get("first").unwrap(), "1");
        assert!(!reg.contains("one"));
    }

    #[test]
    fn test_replace_and_remove() {
        let mut reg = TemplateRegistry::new();
        assert!(!reg.replace("x", "1".to_string()));
        reg.insert("X", "1".to_string());
        assert!(reg.replace("x", "2".to_string()));
        assert_eq!(reg.get("X").unwrap(), "2");
        assert_eq!(reg.remove("x"), Some("2".to_string()));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_images_serialize_as_base64() {
        let mut images = ImageRegistry::new();
        images.insert("dot.png", vec![0x89, b'P', b'N', b'G']);
        let raw = images.encode();
        assert_eq!(raw.get("dot.png").map(String::as_str), Some("iVBORw=="));

        let loaded = ImageRegistry::decode(raw).unwrap();
        assert_eq!(loaded.get("DOT.png").unwrap(), &vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_images_reject_bad_base64() {
        let raw = BTreeMap::from([("a.png".to_string(), "not base64!".to_string())]);
        match ImageRegistry::decode(raw) {
            Err(NotebookError::Base64 { name, .. }) => assert_eq!(name, "a.png"),
            other => panic!("expected base64 error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_case_duplicates() {
        let err = serde_json::from_str::<TemplateRegistry>(r#"{"A":"1","a":"2"}"#);
        assert!(err.unwrap_err().to_string().contains("case-insensitive"));
    }
}
