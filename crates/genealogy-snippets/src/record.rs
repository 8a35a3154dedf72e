//! Page records: a captured page and the genealogy data found on it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gedcomx::{null_as_default, GedcomxData};

/// The page a snippet was captured from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page URL; identifies the record in the catalog.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// URL of the page's favicon.
    #[serde(default, deserialize_with = "null_as_default")]
    pub favicon: String,
    /// Page title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One ingested page paired with its dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Source page.
    pub page: Page,
    /// Persons and relationships captured from the page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: GedcomxData,
}

impl PageRecord {
    /// Create a record for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>, data: GedcomxData) -> Self {
        Self {
            page: Page {
                url: url.into(),
                ..Page::default()
            },
            data,
        }
    }

    /// The dedup key of this record.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.page.url
    }
}
