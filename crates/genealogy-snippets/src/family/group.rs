//! Building display groups: one focal person with their immediate family.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use super::index::RelationshipIndex;
use super::multimap::MultiMap;
use super::siblings::derive_siblings;
use crate::gedcomx::{GedcomxData, Person};

/// One focal person and their resolved relatives.
///
/// A relative category is `None` when no relative of that kind resolved,
/// which is different from (and never represented as) an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonGroup<'a> {
    /// The anchor of the group.
    pub person: &'a Person,
    /// Parents of the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<&'a Person>>,
    /// Children of the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<&'a Person>>,
    /// Spouses of the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouses: Option<Vec<&'a Person>>,
    /// Siblings of the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siblings: Option<Vec<&'a Person>>,
}

impl<'a> PersonGroup<'a> {
    /// Every resolved relative, category by category.
    pub fn relatives(&self) -> impl Iterator<Item = &'a Person> + '_ {
        [
            &self.parents,
            &self.children,
            &self.spouses,
            &self.siblings,
        ]
        .into_iter()
        .flatten()
        .flat_map(|list| list.iter().copied())
    }

    /// Whether the anchor has no resolved relatives at all.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.parents.is_none()
            && self.children.is_none()
            && self.spouses.is_none()
            && self.siblings.is_none()
    }
}

/// Groups the persons of one dataset around anchors.
///
/// The builder indexes relationships and derives siblings once; each call
/// to [`GroupBuilder::build`] is an independent pass with its own seen set.
#[derive(Debug)]
pub struct GroupBuilder<'a> {
    persons: &'a [Person],
    people: HashMap<&'a str, &'a Person>,
    index: RelationshipIndex,
    siblings: MultiMap,
}

impl<'a> GroupBuilder<'a> {
    /// Prepare grouping for a dataset.
    #[must_use]
    pub fn new(data: &'a GedcomxData) -> Self {
        let index = RelationshipIndex::build(&data.relationships);
        let siblings = derive_siblings(&index.children);
        // Later persons with a repeated id shadow earlier ones
        let people = data
            .persons
            .iter()
            .map(|person| (person.id.as_str(), person))
            .collect();
        Self {
            persons: &data.persons,
            people,
            index,
            siblings,
        }
    }

    /// The relationship index backing this builder.
    #[must_use]
    pub fn index(&self) -> &RelationshipIndex {
        &self.index
    }

    /// Derived sibling ids of a person, whether or not they anchor a group.
    #[must_use]
    pub fn siblings_of(&self, id: &str) -> Option<&[String]> {
        self.siblings.get(id)
    }

    /// Emit one group per person not already absorbed into an earlier group.
    ///
    /// Groups come out in the order their anchors appear in the dataset.
    /// A person marked seen as someone's relative never anchors a group.
    #[must_use]
    pub fn build(&self) -> Vec<PersonGroup<'a>> {
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut groups = Vec::new();

        for person in self.persons {
            if seen.contains(person.id.as_str()) {
                continue;
            }
            let id = person.id.as_str();
            let group = PersonGroup {
                person,
                parents: self.resolve(self.index.parents.get(id)),
                children: self.resolve(self.index.children.get(id)),
                spouses: self.resolve(self.index.spouses.get(id)),
                siblings: self.resolve(self.siblings.get(id)),
            };

            seen.insert(id);
            seen.extend(group.relatives().map(|relative| relative.id.as_str()));
            groups.push(group);
        }

        debug!(
            "Grouped {} persons into {} groups",
            self.persons.len(),
            groups.len()
        );
        groups
    }

    /// Look up ids, dropping any that name no person in the dataset.
    fn resolve(&self, ids: Option<&[String]>) -> Option<Vec<&'a Person>> {
        let resolved: Vec<&'a Person> = ids?
            .iter()
            .filter_map(|id| self.people.get(id.as_str()).copied())
            .collect();
        if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }
}

/// Group the persons of a dataset in one pass.
#[must_use]
pub fn group_persons(data: &GedcomxData) -> Vec<PersonGroup<'_>> {
    GroupBuilder::new(data).build()
}
