//! Family grouping: turning a flat dataset into display groups.
//!
//! The pipeline is:
//!
//! 1. [`RelationshipIndex`] builds children, parents and spouses lists from
//!    the relationship edges.
//! 2. [`derive_siblings`] finds siblings through shared parents.
//! 3. [`GroupBuilder`] walks persons in source order and emits one
//!    [`PersonGroup`] per person not already absorbed as someone's relative.
//!
//! # Example
//!
//! ```
//! use genealogy_snippets::family::group_persons;
//! use genealogy_snippets::gedcomx::{GedcomxData, Person, Relationship};
//!
//! let data = GedcomxData {
//!     persons: vec![Person::new("a", "Ann"), Person::new("b", "Bob")],
//!     relationships: vec![Relationship::couple("a", "b")],
//!     ..GedcomxData::default()
//! };
//! let groups = group_persons(&data);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].spouses.as_ref().unwrap()[0].id, "b");
//! ```

mod group;
mod index;
mod multimap;
mod siblings;

use serde::Serialize;

pub use group::{group_persons, GroupBuilder, PersonGroup};
pub use index::RelationshipIndex;
pub use multimap::MultiMap;
pub use siblings::derive_siblings;

use crate::record::{Page, PageRecord};

/// The groups of one page record, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGroups<'a> {
    /// Page the persons were captured from.
    pub page: &'a Page,
    /// Groups in anchor order.
    pub groups: Vec<PersonGroup<'a>>,
}

impl<'a> PageGroups<'a> {
    /// Group the dataset of a single record.
    #[must_use]
    pub fn from_record(record: &'a PageRecord) -> Self {
        Self {
            page: &record.page,
            groups: group_persons(&record.data),
        }
    }
}

/// Group every record of a catalog, keeping catalog order.
#[must_use]
pub fn group_catalog(records: &[PageRecord]) -> Vec<PageGroups<'_>> {
    records.iter().map(PageGroups::from_record).collect()
}
