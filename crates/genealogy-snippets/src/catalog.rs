//! The persisted catalog of page records.
//!
//! The whole catalog is one JSON array in one store slot. Every mutation
//! reads it, changes it in memory and writes it back in a single replace.
//!
//! Stored records are handled as plain JSON values and only decoded into
//! [`PageRecord`]s for display, so a record the display cannot read is
//! still carried through every later write untouched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::PageRecord;
use crate::storage::KeyValueStore;

/// Whether an ingestion added anything to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// At least one record was new.
    Added,
    /// Every record's URL was already present.
    NotAdded,
}

impl IngestOutcome {
    /// Whether at least one record was appended.
    #[must_use]
    pub fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }

    /// The wire name of the outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::NotAdded => "not_added",
        }
    }
}

impl std::fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `page.url` of a raw record, if it has one.
#[must_use]
pub fn record_url(record: &Value) -> Option<&str> {
    record.pointer("/page/url").and_then(Value::as_str)
}

/// Append the records of `batch` whose URL is not yet in `records`.
///
/// URLs already present are collected once. Records are appended in batch
/// order, and a URL appended from this batch also counts as present, so a
/// batch repeating a new URL adds it once. Records without a page URL
/// cannot be deduplicated and are skipped.
pub fn merge_records(records: &mut Vec<Value>, batch: Vec<Value>) -> IngestOutcome {
    let mut known: HashSet<String> = records
        .iter()
        .filter_map(record_url)
        .map(str::to_string)
        .collect();
    let mut outcome = IngestOutcome::NotAdded;

    for record in batch {
        let Some(url) = record_url(&record).map(str::to_string) else {
            warn!("Skipping record without a page URL");
            continue;
        };
        if known.contains(&url) {
            debug!("Skipping already known record for {url}");
        } else {
            debug!("Adding record for {url}");
            known.insert(url);
            records.push(record);
            outcome = IngestOutcome::Added;
        }
    }
    outcome
}

/// The catalog slot of a key-value store.
#[derive(Debug)]
pub struct Catalog<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Catalog<S> {
    /// Use the slot named `key` of `store` as the catalog.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Name of the catalog slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read every stored record as raw JSON.
    ///
    /// A missing or blank slot is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogUndecodable`] if the slot is not a JSON list,
    /// or an error if the store itself cannot be read.
    pub fn load_raw(&self) -> Result<Vec<Value>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| Error::CatalogUndecodable {
            key: self.key.clone(),
            source,
        })
    }

    /// Read every record that can be displayed.
    ///
    /// An undecodable slot reads as empty and a record that does not decode
    /// is left out; both are logged.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub fn load(&self) -> Result<Vec<PageRecord>> {
        let raw = match self.load_raw() {
            Ok(raw) => raw,
            Err(e @ Error::CatalogUndecodable { .. }) => {
                warn!("{e}, showing nothing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut records = Vec::with_capacity(raw.len());
        for (position, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<PageRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Leaving out catalog entry {position}: {e}"),
            }
        }
        Ok(records)
    }

    /// Replace the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn replace(&mut self, records: &[PageRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.key, &raw)?;
        Ok(())
    }

    /// Merge typed records into the catalog.
    ///
    /// # Errors
    ///
    /// See [`Catalog::ingest_raw`].
    pub fn ingest(&mut self, batch: Vec<PageRecord>) -> Result<IngestOutcome> {
        let batch = batch
            .into_iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.ingest_raw(batch)
    }

    /// Merge raw records into the catalog and write it back.
    ///
    /// Existing records are written back exactly as they were read. The
    /// slot is only written when something was added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogUndecodable`] without writing if the stored
    /// catalog is not a JSON list, or an error if the store cannot be read
    /// or written.
    pub fn ingest_raw(&mut self, batch: Vec<Value>) -> Result<IngestOutcome> {
        let mut records = self.load_raw()?;
        let incoming = batch.len();
        let outcome = merge_records(&mut records, batch);
        if outcome.is_added() {
            let raw = serde_json::to_string(&records)?;
            self.store.set(&self.key, &raw)?;
        }

        info!(
            "Ingested batch of {incoming} records: {outcome}, catalog has {} records",
            records.len()
        );
        Ok(outcome)
    }

    /// Empty the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn clear(&mut self) -> Result<()> {
        self.replace(&[])?;
        info!("Cleared catalog {:?}", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gedcomx::{GedcomxData, Person};
    use crate::logging::init_test_logging;
    use crate::storage::{MemoryStore, SqliteStore};
    use serde_json::json;

    fn record(url: &str) -> PageRecord {
        PageRecord::new(
            url,
            GedcomxData {
                persons: vec![Person::new("p1", "Someone")],
                ..GedcomxData::default()
            },
        )
    }

    fn raw(url: &str) -> Value {
        json!({"page": {"url": url, "favicon": "", "title": ""}, "data": {}})
    }

    fn urls(records: &[Value]) -> Vec<&str> {
        records.iter().filter_map(record_url).collect()
    }

    fn catalog() -> Catalog<MemoryStore> {
        Catalog::new(MemoryStore::new(), "list")
    }

    fn seeded(json: &str) -> Catalog<MemoryStore> {
        let mut store = MemoryStore::new();
        store.set("list", json).unwrap();
        Catalog::new(store, "list")
    }

    #[test]
    fn test_merge_into_empty() {
        let mut records = Vec::new();
        let outcome = merge_records(&mut records, vec![raw("a"), raw("b")]);
        assert_eq!(outcome, IngestOutcome::Added);
        assert_eq!(urls(&records), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_skips_known_urls() {
        let mut records = vec![raw("a")];
        let outcome = merge_records(&mut records, vec![raw("a"), raw("c")]);
        assert_eq!(outcome, IngestOutcome::Added);
        assert_eq!(urls(&records), vec!["a", "c"]);
    }

    #[test]
    fn test_merge_all_known_is_not_added() {
        let mut records = vec![raw("a"), raw("b")];
        let outcome = merge_records(&mut records, vec![raw("b"), raw("a")]);
        assert_eq!(outcome, IngestOutcome::NotAdded);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_merge_empty_batch_is_not_added() {
        let mut records = vec![raw("a")];
        assert_eq!(merge_records(&mut records, Vec::new()), IngestOutcome::NotAdded);
    }

    #[test]
    fn test_merge_repeated_new_url_in_batch() {
        let mut records = Vec::new();
        let outcome = merge_records(&mut records, vec![raw("x"), raw("x")]);
        assert_eq!(outcome, IngestOutcome::Added);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_merge_skips_records_without_url() {
        let mut records = Vec::new();
        let outcome = merge_records(&mut records, vec![json!({"data": {}}), json!(3)]);
        assert_eq!(outcome, IngestOutcome::NotAdded);
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_missing_slot_is_empty() {
        assert!(catalog().load().unwrap().is_empty());
    }

    #[test]
    fn test_load_blank_or_garbage_is_empty() {
        init_test_logging();
        assert!(seeded("").load().unwrap().is_empty());
        assert!(seeded("{not json").load().unwrap().is_empty());
    }

    #[test]
    fn test_load_leaves_out_only_unreadable_entries() {
        init_test_logging();
        let catalog = seeded(r#"[{"page": {"url": "a"}}, {"page": 7}, {"page": {"url": "b"}}]"#);
        let records = catalog.load().unwrap();
        let loaded: Vec<&str> = records.iter().map(PageRecord::url).collect();
        assert_eq!(loaded, vec!["a", "b"]);
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let mut catalog = catalog();

        let first = catalog.ingest(vec![record("site.com/x")]).unwrap();
        assert_eq!(first, IngestOutcome::Added);
        assert_eq!(catalog.load().unwrap().len(), 1);

        let second = catalog.ingest(vec![record("site.com/x")]).unwrap();
        assert_eq!(second, IngestOutcome::NotAdded);
        assert_eq!(catalog.load().unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_keeps_records_with_null_fields() {
        let mut catalog = seeded(
            r#"[{"page":{"url":"a","favicon":null,"title":"A"},"data":{"persons":null}},
                {"page":{"url":"b","favicon":"f","title":"B"},"data":{}}]"#,
        );
        assert_eq!(catalog.load().unwrap().len(), 2);

        let outcome = catalog.ingest(vec![record("c")]).unwrap();
        assert_eq!(outcome, IngestOutcome::Added);

        let stored = catalog.load_raw().unwrap();
        assert_eq!(urls(&stored), vec!["a", "b", "c"]);
        assert_eq!(stored[0]["page"]["favicon"], Value::Null);
    }

    #[test]
    fn test_ingest_refuses_to_overwrite_undecodable_slot() {
        init_test_logging();
        let mut catalog = seeded("{not json");

        let err = catalog.ingest(vec![record("a")]).unwrap_err();
        assert!(matches!(err, Error::CatalogUndecodable { .. }));
        assert_eq!(catalog.store().get("list").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_not_added_leaves_slot_untouched() {
        let json = r#"[{"page": {"url": "a", "title": "t", "favicon": "f"}, "data": {}}]"#;
        let mut catalog = seeded(json);

        assert_eq!(catalog.ingest_raw(vec![raw("a")]).unwrap(), IngestOutcome::NotAdded);
        assert_eq!(catalog.store().get("list").unwrap().as_deref(), Some(json));
    }

    #[test]
    fn test_clear_empties_catalog() {
        let mut catalog = catalog();
        let batch = (0..5).map(|i| record(&format!("site.com/{i}"))).collect();
        catalog.ingest(batch).unwrap();
        assert_eq!(catalog.load().unwrap().len(), 5);

        catalog.clear().unwrap();
        assert!(catalog.load().unwrap().is_empty());
        assert_eq!(catalog.store().get("list").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_recovers_an_undecodable_slot() {
        let mut catalog = seeded("{not json");
        catalog.clear().unwrap();
        assert!(catalog.ingest(vec![record("a")]).unwrap().is_added());
    }

    #[test]
    fn test_catalog_uses_its_own_slot() {
        let mut store = MemoryStore::new();
        store.set("other", "keep").unwrap();
        let mut catalog = Catalog::new(store, "list");
        catalog.ingest(vec![record("a")]).unwrap();
        catalog.clear().unwrap();
        assert_eq!(catalog.store().get("other").unwrap().as_deref(), Some("keep"));
    }

    #[test]
    fn test_records_persist_verbatim() {
        let json = r##"[
            {"page":{"url":"u","favicon":"f","title":"t","capturedAt":1},
             "data":{"persons":[],"relationships":[]}},
            {"page":{"url":"w","favicon":"f","title":"t"},
             "data":{"persons":[{"id":"p1","gender":{"type":"http://gedcomx.org/Female"}}],"sourceDescriptions":[{"id":"s1"}]}}
        ]"##;
        let mut catalog = seeded(json);

        catalog.ingest(vec![record("v")]).unwrap();
        let stored = catalog.load_raw().unwrap();
        let original: Vec<Value> = serde_json::from_str(json).unwrap();
        assert_eq!(stored[..2], original[..]);
    }

    #[test]
    fn test_ingest_on_sqlite_store() {
        let mut catalog = Catalog::new(SqliteStore::open_in_memory().unwrap(), "list");
        assert!(catalog.ingest(vec![record("a")]).unwrap().is_added());
        assert!(!catalog.ingest(vec![record("a")]).unwrap().is_added());
        assert_eq!(catalog.load().unwrap().len(), 1);
    }

    #[test]
    fn test_outcome_wire_names() {
        assert_eq!(IngestOutcome::Added.to_string(), "added");
        assert_eq!(IngestOutcome::NotAdded.as_str(), "not_added");
        assert_eq!(
            serde_json::to_string(&IngestOutcome::NotAdded).unwrap(),
            "\"not_added\""
        );
    }
}
