//! An insertion-ordered map from person id to a list of person ids.

use std::collections::{HashMap, HashSet};

/// Map from a key id to an ordered, growable list of ids.
///
/// Keys iterate in first-insertion order and values keep the order they
/// were appended in, so everything derived from the map is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiMap {
    slots: HashMap<String, usize>,
    entries: Vec<(String, Vec<String>)>,
}

impl MultiMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the list for `key`, creating the list if needed.
    pub fn insert(&mut self, key: &str, value: &str) {
        let slot = match self.slots.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                let slot = self.entries.len() - 1;
                self.slots.insert(key.to_string(), slot);
                slot
            }
        };
        self.entries[slot].1.push(value.to_string());
    }

    /// The list for `key`, if anything was ever inserted under it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.slots
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Iterate keys and their lists in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop repeated values from every list, keeping first occurrences.
    pub fn dedup_values(&mut self) {
        for (_, values) in &mut self.entries {
            let mut kept = HashSet::with_capacity(values.len());
            values.retain(|value| kept.insert(value.clone()));
        }
    }
}
