//! Adjacency lists built from a dataset's relationship edges.

use tracing::trace;

use super::multimap::MultiMap;
use crate::gedcomx::{Relationship, RelationshipType};

/// Children, parents and spouses of every person mentioned by an edge.
///
/// Ids are taken from the edges as-is; nothing here checks that they name
/// a person in the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipIndex {
    /// Parent id to child ids.
    pub children: MultiMap,
    /// Child id to parent ids.
    pub parents: MultiMap,
    /// Person id to spouse ids, recorded in both directions.
    pub spouses: MultiMap,
}

impl RelationshipIndex {
    /// Index a list of edges in encounter order.
    #[must_use]
    pub fn build(relationships: &[Relationship]) -> Self {
        let mut index = Self::default();
        for relationship in relationships {
            let p1 = relationship.person1.person_id();
            let p2 = relationship.person2.person_id();
            match &relationship.kind {
                RelationshipType::Couple => {
                    index.spouses.insert(p1, p2);
                    index.spouses.insert(p2, p1);
                }
                RelationshipType::ParentChild => {
                    index.children.insert(p1, p2);
                    index.parents.insert(p2, p1);
                }
                RelationshipType::Other(uri) => {
                    trace!("Ignoring relationship of type {uri:?} between {p1} and {p2}");
                }
            }
        }
        index
    }
}
