//! In-process slot store.

use std::collections::HashMap;

use super::{fingerprint, KeyValueStore};
use crate::error::Result;

/// Slots held in a map; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        if self.slots.get(key).is_some_and(|current| current == value) {
            return Ok(false);
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn fingerprint(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).map(|value| fingerprint(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        assert!(store.set("k", "v").unwrap());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_identical_write_is_not_a_change() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert!(!store.set("k", "v").unwrap());
        assert!(store.set("k", "w").unwrap());
    }

    #[test]
    fn test_fingerprint_matches_sqlite_digest() {
        let mut store = MemoryStore::new();
        store.set("k", "value").unwrap();
        assert_eq!(store.fingerprint("k").unwrap(), Some(fingerprint("value")));
    }
}
