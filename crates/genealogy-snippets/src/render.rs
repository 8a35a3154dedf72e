//! Plain-text cards for display groups.

use std::sync::OnceLock;

use regex::Regex;

use crate::family::{PageGroups, PersonGroup};
use crate::gedcomx::{Fact, Person};

/// Shown in place of a name that cannot be assembled.
pub const UNKNOWN_NAME: &str = "[unknown]";

/// The display name of a person, or [`UNKNOWN_NAME`].
#[must_use]
pub fn display_name(person: &Person) -> String {
    person
        .display_name()
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

fn camel_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\B([A-Z])").expect("valid regex"))
}

/// Human label for a fact type URI: `http://gedcomx.org/MaritalStatus`
/// becomes `Marital Status`. Every capital inside a word gets a space in
/// front of it, so `DNAMatch` becomes `D N A Match`.
#[must_use]
pub fn fact_label(fact_type: &str) -> String {
    let name = fact_type.rsplit('/').next().unwrap_or(fact_type);
    camel_boundary().replace_all(name, " $1").into_owned()
}

/// Value, date and place of a fact, skipping the ones that are empty.
#[must_use]
pub fn fact_detail(fact: &Fact) -> String {
    [
        fact.value.as_deref(),
        fact.date.as_ref().and_then(|d| d.original.as_deref()),
        fact.place.as_ref().and_then(|p| p.original.as_deref()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("; ")
}

/// Render one group as a card.
///
/// Every line of the card, the last one included, ends in a newline.
#[must_use]
pub fn render_group(group: &PersonGroup<'_>, page_groups: &PageGroups<'_>) -> String {
    let mut lines = vec![format!("== {} ==", display_name(group.person))];

    lines.extend(
        group
            .person
            .facts
            .iter()
            .map(|fact| format!("{}: {}", fact_label(&fact.fact_type), fact_detail(fact))),
    );

    for (label, relatives) in [
        ("Parents", &group.parents),
        ("Spouses", &group.spouses),
        ("Children", &group.children),
        ("Siblings", &group.siblings),
    ] {
        if let Some(relatives) = relatives {
            let names: Vec<String> = relatives.iter().map(|p| display_name(p)).collect();
            lines.push(format!("{label}: {}", names.join(", ")));
        }
    }

    let page = page_groups.page;
    lines.push(if page.title.is_empty() {
        format!("-- {}", page.url)
    } else {
        format!("-- {} <{}>", page.title, page.url)
    });

    let mut card = lines.join("\n");
    card.push('\n');
    card
}

/// Render every group of every page, cards separated by blank lines.
#[must_use]
pub fn render_catalog(pages: &[PageGroups<'_>]) -> String {
    pages
        .iter()
        .flat_map(|page| page.groups.iter().map(move |group| render_group(group, page)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::group_catalog;
    use crate::gedcomx::{DateInfo, GedcomxData, PlaceReference, Relationship};
    use crate::record::PageRecord;

    #[test]
    fn test_fact_label() {
        assert_eq!(fact_label("http://gedcomx.org/Birth"), "Birth");
        assert_eq!(fact_label("http://gedcomx.org/MaritalStatus"), "Marital Status");
        assert_eq!(fact_label("Occupation"), "Occupation");
        assert_eq!(fact_label("data:,CustomFactType"), "data:,Custom Fact Type");
        assert_eq!(fact_label("http://gedcomx.org/DNAMatch"), "D N A Match");
        assert_eq!(fact_label("http://gedcomx.org/NumberOfChildren"), "Number Of Children");
    }

    #[test]
    fn test_fact_detail_skips_missing_parts() {
        let fact = Fact {
            fact_type: "http://gedcomx.org/Birth".to_string(),
            value: None,
            date: Some(DateInfo {
                original: Some("3 May 1850".to_string()),
                ..DateInfo::default()
            }),
            place: Some(PlaceReference {
                original: Some("Cork, Ireland".to_string()),
                ..PlaceReference::default()
            }),
            ..Fact::default()
        };
        assert_eq!(fact_detail(&fact), "3 May 1850; Cork, Ireland");

        let fact = Fact {
            value: Some("Farmer".to_string()),
            ..Fact::default()
        };
        assert_eq!(fact_detail(&fact), "Farmer");
    }

    #[test]
    fn test_display_name_placeholder() {
        let person: Person = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(display_name(&person), UNKNOWN_NAME);
    }

    #[test]
    fn test_render_card() {
        let mut record = PageRecord::new(
            "https://example.org/ark:/1",
            GedcomxData {
                persons: vec![
                    Person::new("A", "Alice"),
                    Person::new("B", "Bob"),
                    Person::new("C", "Carol"),
                ],
                relationships: vec![
                    Relationship::parent_child("A", "C"),
                    Relationship::couple("A", "B"),
                ],
                ..GedcomxData::default()
            },
        );
        record.page.title = "Alice's record".to_string();
        record.data.persons[0].facts.push(Fact {
            fact_type: "http://gedcomx.org/Birth".to_string(),
            date: Some(DateInfo {
                original: Some("1900".to_string()),
                ..DateInfo::default()
            }),
            ..Fact::default()
        });

        let records = vec![record];
        let pages = group_catalog(&records);
        let card = render_catalog(&pages);

        assert_eq!(
            card,
            "== Alice ==\n\
             Birth: 1900\n\
             Spouses: Bob\n\
             Children: Carol\n\
             -- Alice's record <https://example.org/ark:/1>\n"
        );
    }

    #[test]
    fn test_render_standalone_without_title() {
        let records = vec![PageRecord::new(
            "site.com/x",
            GedcomxData {
                persons: vec![serde_json::from_str(r#"{"id": "x"}"#).unwrap()],
                ..GedcomxData::default()
            },
        )];
        let pages = group_catalog(&records);
        assert_eq!(render_catalog(&pages), "== [unknown] ==\n-- site.com/x\n");
    }
}
