// src/signup/registry.rs

use super::SignupError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serenity::model::id::RoleId;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Whole-document persistence for the registry. Every mutation rewrites the
/// entire document; there is no append log.
pub trait SlotStore {
    fn read(&self) -> Result<Option<Vec<u8>>, SignupError>;
    fn write(&self, bytes: &[u8]) -> Result<(), SignupError>;
}

/// One JSON file on disk, `{"21": 123456789, ...}`.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SlotStore for FileStore {
    fn read(&self) -> Result<Option<Vec<u8>>, SignupError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SignupError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// Ordered mapping from slot label to the role backing it. The order is
/// insertion order after `open`, ascending-numeric after a reconciliation;
/// callers get no guarantee beyond "stable until the next mutation".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SignupRegistry {
    slots: Vec<(String, RoleId)>,
}

impl SignupRegistry {
    /// Loads the persisted registry. Absent, unreadable, or malformed state
    /// all yield an empty registry; corruption is never surfaced as an error.
    pub fn load(store: &impl SlotStore) -> SignupRegistry {
        let Ok(Some(bytes)) = store.read() else {
            return SignupRegistry::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    /// Writes the whole registry through the store in one call.
    pub fn save(&self, store: &impl SlotStore) -> Result<(), SignupError> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| SignupError::ExternalSystemUnavailable(e.to_string()))?;
        store.write(&bytes)
    }

    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (String, RoleId)>) -> Self {
        Self {
            slots: pairs.into_iter().collect(),
        }
    }

    /// Opens a new slot and persists. The in-memory insertion is rolled back
    /// if the write fails, so the mutation is all-or-nothing.
    pub fn open(
        &mut self,
        label: &str,
        tag: RoleId,
        store: &impl SlotStore,
    ) -> Result<(), SignupError> {
        if self.get(label).is_some() {
            return Err(SignupError::DuplicateSlot(label.to_string()));
        }
        self.slots.push((label.to_string(), tag));
        if let Err(e) = self.save(store) {
            self.slots.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Closes a slot and persists, returning the role it was backed by.
    pub fn close(&mut self, label: &str, store: &impl SlotStore) -> Result<RoleId, SignupError> {
        let pos = self
            .slots
            .iter()
            .position(|(l, _)| l == label)
            .ok_or_else(|| SignupError::UnknownSlot(label.to_string()))?;
        let removed = self.slots.remove(pos);
        if let Err(e) = self.save(store) {
            self.slots.insert(pos, removed);
            return Err(e);
        }
        Ok(removed.1)
    }

    pub fn get(&self, label: &str) -> Option<RoleId> {
        self.slots
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, tag)| *tag)
    }

    pub fn all(&self) -> impl Iterator<Item = (&str, RoleId)> {
        self.slots.iter().map(|(label, tag)| (label.as_str(), *tag))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// The persisted form is a flat JSON object. serde_json's own map type would
// reorder keys, so both directions go through explicit impls that keep slot
// order intact.
impl Serialize for SignupRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (label, tag) in &self.slots {
            map.serialize_entry(label, &tag.get())?;
        }
        map.end()
    }
}

struct RegistryVisitor;

impl<'de> Visitor<'de> for RegistryVisitor {
    type Value = SignupRegistry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of slot label to role id")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut registry = SignupRegistry::default();
        while let Some((label, raw)) = access.next_entry::<String, u64>()? {
            if raw == 0 {
                continue;
            }
            let tag = RoleId::new(raw);
            match registry.slots.iter_mut().find(|(l, _)| *l == label) {
                // duplicate key in the document: last one wins
                Some(entry) => entry.1 = tag,
                None => registry.slots.push((label, tag)),
            }
        }
        Ok(registry)
    }
}

impl<'de> Deserialize<'de> for SignupRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RegistryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::testutil::MemoryStore;

    fn tag(id: u64) -> RoleId {
        RoleId::new(id)
    }

    #[test]
    fn open_and_close_track_the_net_set_of_slots() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();

        registry.open("21", tag(1), &store).unwrap();
        registry.open("22", tag(2), &store).unwrap();
        registry.open("23", tag(3), &store).unwrap();
        registry.close("22", &store).unwrap();

        let labels: Vec<&str> = registry.all().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["21", "23"]);
    }

    #[test]
    fn open_duplicate_fails_and_leaves_registry_unchanged() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", tag(1), &store).unwrap();

        let err = registry.open("21", tag(9), &store).unwrap_err();
        assert!(matches!(err, SignupError::DuplicateSlot(ref l) if l == "21"));
        assert_eq!(registry.get("21"), Some(tag(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn close_unknown_fails_and_leaves_registry_unchanged() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", tag(1), &store).unwrap();

        let err = registry.close("5", &store).unwrap_err();
        assert!(matches!(err, SignupError::UnknownSlot(ref l) if l == "5"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_persistence_rolls_back_the_mutation() {
        let mut store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", tag(1), &store).unwrap();

        store.fail_writes = true;
        assert!(registry.open("22", tag(2), &store).is_err());
        assert_eq!(registry.len(), 1);
        assert!(registry.close("21", &store).is_err());
        assert_eq!(registry.get("21"), Some(tag(1)));
    }

    #[test]
    fn load_of_absent_store_is_empty() {
        let store = MemoryStore::new();
        assert!(SignupRegistry::load(&store).is_empty());
    }

    #[test]
    fn load_of_corrupt_document_is_empty_not_an_error() {
        let store = MemoryStore::seeded(b"{ invalid json");
        assert!(SignupRegistry::load(&store).is_empty());
    }

    #[test]
    fn load_preserves_document_order() {
        let store = MemoryStore::seeded(br#"{"9": 109, "22": 122, "3": 103}"#);
        let registry = SignupRegistry::load(&store);
        let labels: Vec<&str> = registry.all().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["9", "22", "3"]);
    }

    #[test]
    fn save_then_load_round_trips_in_order() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("9", tag(109), &store).unwrap();
        registry.open("22", tag(122), &store).unwrap();

        let reloaded = SignupRegistry::load(&store);
        assert_eq!(reloaded, registry);
    }

    #[test]
    fn file_store_reads_back_what_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("hours.json"));

        assert!(store.read().unwrap().is_none());
        store.write(b"{\"21\": 1}").unwrap();
        assert_eq!(store.read().unwrap().unwrap(), b"{\"21\": 1}");
    }
}
