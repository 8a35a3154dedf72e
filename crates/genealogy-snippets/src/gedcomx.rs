//! The subset of the GEDCOM X data model the viewer reads.
//!
//! Only the fields used for grouping and display are typed. Everything else
//! a record carries is kept in `extra` maps so a catalog written back to the
//! store is the same JSON the extension sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a field, reading an explicit `null` as the type's default.
///
/// Extensions write `null` for fields they could not fill; those records
/// still have to load.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// URI of the symmetric couple relationship type.
pub const COUPLE: &str = "http://gedcomx.org/Couple";

/// URI of the directed parent-child relationship type.
pub const PARENT_CHILD: &str = "http://gedcomx.org/ParentChild";

/// One GEDCOM X document: the persons and relationships captured from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GedcomxData {
    /// Persons in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub persons: Vec<Person>,
    /// Relationship edges between persons.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Identifier, unique within one document.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Names, preferred first.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub names: Vec<Name>,
    /// Life facts in source order.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub facts: Vec<Fact>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    /// Create a person with the given id and full-text name.
    #[must_use]
    pub fn new(id: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            names: vec![Name {
                name_forms: vec![NameForm {
                    full_text: Some(full_text.into()),
                    ..NameForm::default()
                }],
                extra: Map::new(),
            }],
            ..Self::default()
        }
    }

    /// The name to show for this person, if one can be assembled.
    ///
    /// Uses the first form of the first name: its full text when present and
    /// non-empty, otherwise its part values joined by a space.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let form = self.names.first()?.name_forms.first()?;
        if let Some(full_text) = form.full_text.as_deref().filter(|t| !t.is_empty()) {
            return Some(full_text.to_string());
        }
        let joined = form
            .parts
            .iter()
            .map(|part| part.value.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// A name of a person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    /// Representations of the name, preferred first.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub name_forms: Vec<NameForm>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One representation of a name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameForm {
    /// Precomposed full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    /// Name parts in display order.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parts: Vec<NamePart>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A given name, surname, prefix and so on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamePart {
    /// Text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A life event or characteristic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Fact type URI, e.g. `http://gedcomx.org/Birth`.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub fact_type: String,
    /// Free-form value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// When it happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateInfo>,
    /// Where it happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<PlaceReference>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A date as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateInfo {
    /// Original date text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A place as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceReference {
    /// Original place text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The kinds of relationship the viewer understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Two persons in a couple; symmetric.
    Couple,
    /// `person1` is a parent of `person2`.
    ParentChild,
    /// Any other type URI, carried through untouched.
    Other(String),
}

impl From<String> for RelationshipType {
    fn from(uri: String) -> Self {
        match uri.as_str() {
            COUPLE => Self::Couple,
            PARENT_CHILD => Self::ParentChild,
            _ => Self::Other(uri),
        }
    }
}

impl From<RelationshipType> for String {
    fn from(kind: RelationshipType) -> Self {
        match kind {
            RelationshipType::Couple => COUPLE.to_string(),
            RelationshipType::ParentChild => PARENT_CHILD.to_string(),
            RelationshipType::Other(uri) => uri,
        }
    }
}

impl Default for RelationshipType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// An edge between two persons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Kind of edge.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: RelationshipType,
    /// First endpoint (the parent for parent-child edges).
    #[serde(default, deserialize_with = "null_as_default")]
    pub person1: ResourceReference,
    /// Second endpoint (the child for parent-child edges).
    #[serde(default, deserialize_with = "null_as_default")]
    pub person2: ResourceReference,
    /// Fields not interpreted by the viewer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Relationship {
    /// Build an edge between two person ids.
    #[must_use]
    pub fn new(kind: RelationshipType, person1: &str, person2: &str) -> Self {
        Self {
            kind,
            person1: ResourceReference::to_person(person1),
            person2: ResourceReference::to_person(person2),
            extra: Map::new(),
        }
    }

    /// A couple edge.
    #[must_use]
    pub fn couple(person1: &str, person2: &str) -> Self {
        Self::new(RelationshipType::Couple, person1, person2)
    }

    /// A parent-child edge.
    #[must_use]
    pub fn parent_child(parent: &str, child: &str) -> Self {
        Self::new(RelationshipType::ParentChild, parent, child)
    }
}

/// A local reference to a person, written `#<id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    /// The reference URI.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: String,
    /// Fields not interpreted by the viewer, such as `resourceId`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceReference {
    /// Reference the person with the given id.
    #[must_use]
    pub fn to_person(id: &str) -> Self {
        Self {
            resource: format!("#{id}"),
            extra: Map::new(),
        }
    }

    /// The referenced person id with its leading `#` removed.
    #[must_use]
    pub fn person_id(&self) -> &str {
        self.resource
            .strip_prefix('#')
            .unwrap_or(&self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_person_with_parts() {
        let json = r#"{
            "id": "p1",
            "names": [{"nameForms": [{"parts": [
                {"type": "http://gedcomx.org/Given", "value": "Ada"},
                {"type": "http://gedcomx.org/Surname", "value": "Lovelace"}
            ]}]}],
            "facts": [{"type": "http://gedcomx.org/Birth", "date": {"original": "1815"}}]
        }"#;
        let person: Person = serde_json::from_str(json).unwrap();

        assert_eq!(person.id, "p1");
        assert_eq!(person.display_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(person.facts.len(), 1);
        assert_eq!(
            person.facts[0].date.as_ref().unwrap().original.as_deref(),
            Some("1815")
        );
    }

    #[test]
    fn test_display_name_prefers_full_text() {
        let mut person = Person::new("p1", "John Smith");
        person.names[0].name_forms[0].parts = vec![NamePart {
            value: Some("Ignored".to_string()),
            extra: Map::new(),
        }];
        assert_eq!(person.display_name().as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_display_name_empty_full_text_falls_back_to_parts() {
        let json = r#"{"id": "p", "names": [{"nameForms": [{"fullText": "", "parts": [{"value": "Mary"}]}]}]}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.display_name().as_deref(), Some("Mary"));
    }

    #[test]
    fn test_display_name_missing() {
        let person: Person = serde_json::from_str(r#"{"id": "p"}"#).unwrap();
        assert!(person.display_name().is_none());

        let person: Person =
            serde_json::from_str(r#"{"id": "p", "names": [{"nameForms": []}]}"#).unwrap();
        assert!(person.display_name().is_none());
    }

    #[test]
    fn test_relationship_type_from_uri() {
        assert_eq!(
            RelationshipType::from(COUPLE.to_string()),
            RelationshipType::Couple
        );
        assert_eq!(
            RelationshipType::from(PARENT_CHILD.to_string()),
            RelationshipType::ParentChild
        );
        assert_eq!(
            RelationshipType::from("http://gedcomx.org/EnslavedBy".to_string()),
            RelationshipType::Other("http://gedcomx.org/EnslavedBy".to_string())
        );
    }

    #[test]
    fn test_relationship_deserialize() {
        let json = r##"{
            "type": "http://gedcomx.org/ParentChild",
            "person1": {"resource": "#p1"},
            "person2": {"resource": "#p2"}
        }"##;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.kind, RelationshipType::ParentChild);
        assert_eq!(rel.person1.person_id(), "p1");
        assert_eq!(rel.person2.person_id(), "p2");
    }

    #[test]
    fn test_person_id_without_hash() {
        let reference = ResourceReference {
            resource: "p9".to_string(),
            ..ResourceReference::default()
        };
        assert_eq!(reference.person_id(), "p9");
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let json = r##"{
            "description": "#sd1",
            "persons": [{"id": "p1", "gender": {"type": "http://gedcomx.org/Male"}}],
            "relationships": [{
                "id": "r1",
                "type": "http://gedcomx.org/Couple",
                "person1": {"resource": "#p1"},
                "person2": {"resource": "#p2"}
            }]
        }"##;
        let data: GedcomxData = serde_json::from_str(json).unwrap();
        let back: Value = serde_json::to_value(&data).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let json = r##"{
            "persons": [{
                "id": "p1",
                "names": null,
                "facts": [{"type": null, "value": null, "date": null}]
            }],
            "relationships": [{"type": null, "person1": null, "person2": {"resource": null}}]
        }"##;
        let data: GedcomxData = serde_json::from_str(json).unwrap();

        assert!(data.persons[0].names.is_empty());
        assert_eq!(data.persons[0].facts[0].fact_type, "");
        assert!(data.persons[0].facts[0].value.is_none());
        assert_eq!(data.relationships[0].kind, RelationshipType::default());
        assert_eq!(data.relationships[0].person1.person_id(), "");

        let data: GedcomxData =
            serde_json::from_str(r#"{"persons": null, "relationships": null}"#).unwrap();
        assert!(data.persons.is_empty());
        assert!(data.relationships.is_empty());
    }

    #[test]
    fn test_empty_collections_are_kept() {
        let json = r#"{"persons": [], "relationships": []}"#;
        let data: GedcomxData = serde_json::from_str(json).unwrap();
        let back: Value = serde_json::to_value(&data).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let data: GedcomxData = serde_json::from_str("{}").unwrap();
        assert!(data.persons.is_empty());
        assert!(data.relationships.is_empty());
    }
}
