//! Sibling sets derived from shared parents.

use super::multimap::MultiMap;

/// Derive siblings from a parent-to-children map.
///
/// Any two distinct children listed under the same parent are siblings of
/// each other. A child reached through several shared parents is listed
/// once. Half-siblings are not told apart from full siblings.
#[must_use]
pub fn derive_siblings(children: &MultiMap) -> MultiMap {
    let mut siblings = MultiMap::new();
    for (_, kids) in children.iter() {
        for child in kids {
            for other in kids {
                if child != other {
                    siblings.insert(child, other);
                }
            }
        }
    }
    siblings.dedup_values();
    siblings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::RelationshipIndex;
    use crate::gedcomx::Relationship;

    fn children_of(edges: &[(&str, &str)]) -> MultiMap {
        let relationships: Vec<Relationship> = edges
            .iter()
            .map(|(parent, child)| Relationship::parent_child(parent, child))
            .collect();
        RelationshipIndex::build(&relationships).children
    }

    #[test]
    fn test_two_shared_parents_list_sibling_once() {
        let siblings = derive_siblings(&children_of(&[
            ("A", "C"),
            ("A", "D"),
            ("B", "C"),
            ("B", "D"),
        ]));

        assert_eq!(siblings.get("C"), Some(&["D".to_string()][..]));
        assert_eq!(siblings.get("D"), Some(&["C".to_string()][..]));
    }

    #[test]
    fn test_symmetric_and_irreflexive() {
        let siblings = derive_siblings(&children_of(&[
            ("P", "a"),
            ("P", "b"),
            ("P", "c"),
            ("Q", "c"),
            ("Q", "d"),
        ]));

        for (person, list) in siblings.iter() {
            assert!(!list.iter().any(|s| s == person), "{person} is own sibling");
            for other in list {
                let back = siblings.get(other).unwrap();
                assert!(back.iter().any(|s| s == person), "{other} lacks {person}");
            }
        }
    }

    #[test]
    fn test_half_siblings_are_siblings() {
        let siblings = derive_siblings(&children_of(&[("P", "c"), ("P", "x"), ("Q", "c"), ("Q", "y")]));
        assert_eq!(
            siblings.get("c"),
            Some(&["x".to_string(), "y".to_string()][..])
        );
        assert_eq!(siblings.get("x"), Some(&["c".to_string()][..]));
    }

    #[test]
    fn test_only_child_has_no_siblings() {
        let siblings = derive_siblings(&children_of(&[("P", "solo")]));
        assert!(siblings.get("solo").is_none());
        assert!(siblings.is_empty());
    }

    #[test]
    fn test_repeated_child_edge_is_not_own_sibling() {
        let siblings = derive_siblings(&children_of(&[("P", "c"), ("P", "c")]));
        assert!(siblings.get("c").is_none());
    }
}
