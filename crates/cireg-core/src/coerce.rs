//! Raw string to property value coercion
//!
//! | Kind | Empty input | Non-empty input |
//! |---|---|---|
//! | `BOOLEAN` | `false` | `true` iff equal to `"true"`, ignoring ASCII case |
//! | `INTEGER` | unset | base-10 `i32` |
//! | `CI` | reference with empty id | reference with id = input |
//! | `SET_OF_*` / `LIST_OF_*` | empty collection | comma split, trimmed, empties dropped |
//! | `MAP_STRING_STRING` | empty map | `&`-separated `key=value` entries, keys unique |
//! | anything else | input as-is | input as-is |
//!
//! An absent input is always unset, whatever the kind.

use crate::error::CoercionError;
use cireg_model::{ConfigurationItem, PropertyDescriptor, PropertyKind, PropertyValue, Type};
use indexmap::{IndexMap, IndexSet};

/// Separator between collection elements
pub const LIST_SEPARATOR: char = ',';
/// Separator between map entries
pub const MAP_ENTRY_SEPARATOR: char = '&';
/// Separator between a map key and its value
pub const MAP_KEY_SEPARATOR: char = '=';

/// Converts raw strings into values shaped by a property's kind
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyCoercer;

impl PropertyCoercer {
    /// Create coercer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Coerce `raw` for the property described by `pd`
    ///
    /// `Ok(None)` means the property should be left unset.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] for non-numeric integers, malformed or
    /// repeated map entries, and CI kinds lacking a referenced type.
    pub fn coerce(&self, raw: Option<&str>, pd: &PropertyDescriptor) -> Result<Option<PropertyValue>, CoercionError> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let value = match pd.kind() {
            PropertyKind::Boolean => PropertyValue::Boolean(raw.eq_ignore_ascii_case("true")),
            PropertyKind::Integer => {
                if raw.is_empty() {
                    return Ok(None);
                }
                let parsed = raw.parse::<i32>().map_err(|source| CoercionError::InvalidInteger {
                    property: pd.name().to_string(),
                    raw: raw.to_string(),
                    source,
                })?;
                PropertyValue::Integer(parsed)
            }
            PropertyKind::Ci => PropertyValue::Ci(ConfigurationItem::reference(referenced_type(pd)?.clone(), raw)),
            PropertyKind::SetOfString => {
                PropertyValue::SetOfString(split_values(raw).map(str::to_string).collect())
            }
            PropertyKind::ListOfString => {
                PropertyValue::ListOfString(split_values(raw).map(str::to_string).collect())
            }
            PropertyKind::SetOfCi => {
                let ty = referenced_type(pd)?;
                PropertyValue::SetOfCi(references(ty, raw).collect::<IndexSet<_>>())
            }
            PropertyKind::ListOfCi => {
                let ty = referenced_type(pd)?;
                PropertyValue::ListOfCi(references(ty, raw).collect())
            }
            PropertyKind::MapStringString => PropertyValue::MapStringString(parse_map(pd, raw)?),
            PropertyKind::String | PropertyKind::Enum => PropertyValue::String(raw.to_string()),
        };
        Ok(Some(value))
    }
}

/// Comma-separated elements, trimmed, with empty elements dropped
pub fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

fn references<'a>(ty: &'a Type, raw: &'a str) -> impl Iterator<Item = ConfigurationItem> + 'a {
    split_values(raw).map(move |id| ConfigurationItem::reference(ty.clone(), id))
}

fn referenced_type(pd: &PropertyDescriptor) -> Result<&Type, CoercionError> {
    pd.referenced_type().ok_or_else(|| CoercionError::MissingReferencedType {
        property: pd.name().to_string(),
    })
}

fn parse_map(pd: &PropertyDescriptor, raw: &str) -> Result<IndexMap<String, String>, CoercionError> {
    let mut entries = IndexMap::new();
    if raw.is_empty() {
        return Ok(entries);
    }
    for entry in raw.split(MAP_ENTRY_SEPARATOR) {
        let malformed = || CoercionError::MalformedMapEntry {
            property: pd.name().to_string(),
            entry: entry.to_string(),
        };
        let (key, value) = entry.split_once(MAP_KEY_SEPARATOR).ok_or_else(malformed)?;
        if value.contains(MAP_KEY_SEPARATOR) {
            return Err(malformed());
        }
        if entries.contains_key(key) {
            return Err(CoercionError::DuplicateMapKey {
                property: pd.name().to_string(),
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), value.to_string());
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const ALL_KINDS: [PropertyKind; 10] = [
        PropertyKind::Boolean,
        PropertyKind::Integer,
        PropertyKind::String,
        PropertyKind::Enum,
        PropertyKind::Ci,
        PropertyKind::SetOfString,
        PropertyKind::ListOfString,
        PropertyKind::SetOfCi,
        PropertyKind::ListOfCi,
        PropertyKind::MapStringString,
    ];

    fn pd(kind: PropertyKind) -> PropertyDescriptor {
        let pd = PropertyDescriptor::new("p", kind);
        if kind.references_ci() {
            pd.referencing(Type::new("jee.FilterSpec"))
        } else {
            pd
        }
    }

    fn coerce(raw: Option<&str>, kind: PropertyKind) -> Option<PropertyValue> {
        PropertyCoercer::new().coerce(raw, &pd(kind)).unwrap()
    }

    fn filter(id: &str) -> ConfigurationItem {
        ConfigurationItem::reference(Type::new("jee.FilterSpec"), id)
    }

    #[test]
    fn absent_input_is_unset_for_every_kind() {
        for kind in ALL_KINDS {
            assert_eq!(coerce(None, kind), None, "{kind:?}");
        }
    }

    #[test]
    fn empty_input_yields_kind_default() {
        assert_eq!(coerce(Some(""), PropertyKind::Boolean), Some(PropertyValue::Boolean(false)));
        assert_eq!(coerce(Some(""), PropertyKind::Integer), None);
        assert_eq!(coerce(Some(""), PropertyKind::String), Some(PropertyValue::String(String::new())));
        assert_eq!(coerce(Some(""), PropertyKind::Enum), Some(PropertyValue::String(String::new())));
        assert_eq!(coerce(Some(""), PropertyKind::Ci), Some(PropertyValue::Ci(filter(""))));
        assert_eq!(
            coerce(Some(""), PropertyKind::SetOfString),
            Some(PropertyValue::SetOfString(IndexSet::new()))
        );
        assert_eq!(
            coerce(Some(""), PropertyKind::ListOfString),
            Some(PropertyValue::ListOfString(Vec::new()))
        );
        assert_eq!(coerce(Some(""), PropertyKind::SetOfCi), Some(PropertyValue::SetOfCi(IndexSet::new())));
        assert_eq!(coerce(Some(""), PropertyKind::ListOfCi), Some(PropertyValue::ListOfCi(Vec::new())));
        assert_eq!(
            coerce(Some(""), PropertyKind::MapStringString),
            Some(PropertyValue::MapStringString(IndexMap::new()))
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(coerce(Some("TRUE"), PropertyKind::Boolean), Some(PropertyValue::Boolean(true)));
        assert_eq!(coerce(Some("True"), PropertyKind::Boolean), Some(PropertyValue::Boolean(true)));
        assert_eq!(coerce(Some("yes"), PropertyKind::Boolean), Some(PropertyValue::Boolean(false)));
        assert_eq!(coerce(Some(" true"), PropertyKind::Boolean), Some(PropertyValue::Boolean(false)));
    }

    #[test]
    fn integers() {
        assert_eq!(coerce(Some("-42"), PropertyKind::Integer), Some(PropertyValue::Integer(-42)));
        assert_eq!(coerce(Some("+7"), PropertyKind::Integer), Some(PropertyValue::Integer(7)));

        let err = PropertyCoercer::new()
            .coerce(Some("4x"), &pd(PropertyKind::Integer))
            .unwrap_err();
        assert!(matches!(err, CoercionError::InvalidInteger { ref raw, .. } if raw == "4x"));
        assert!(PropertyCoercer::new()
            .coerce(Some(" 4"), &pd(PropertyKind::Integer))
            .is_err());
        assert!(PropertyCoercer::new()
            .coerce(Some("2147483648"), &pd(PropertyKind::Integer))
            .is_err());
    }

    #[test]
    fn string_collections_trim_and_drop_empties() {
        let expected: IndexSet<String> = ["a", "b", "c"].into_iter().map(String::from).collect();
        assert_eq!(
            coerce(Some("a, b , ,c"), PropertyKind::SetOfString),
            Some(PropertyValue::SetOfString(expected))
        );
        assert_eq!(
            coerce(Some("a, b , ,c"), PropertyKind::ListOfString),
            Some(PropertyValue::ListOfString(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn set_equality_ignores_order_and_absorbs_duplicates() {
        assert_eq!(coerce(Some("b,a,b"), PropertyKind::SetOfString), coerce(Some("a,b"), PropertyKind::SetOfString));
        assert_eq!(
            coerce(Some("a,a"), PropertyKind::ListOfString),
            Some(PropertyValue::ListOfString(vec!["a".into(), "a".into()]))
        );
    }

    #[test]
    fn ci_collections_become_references_of_referenced_type() {
        assert_eq!(
            coerce(Some("x,y"), PropertyKind::ListOfCi),
            Some(PropertyValue::ListOfCi(vec![filter("x"), filter("y")]))
        );
        let Some(PropertyValue::SetOfCi(set)) = coerce(Some("x,y"), PropertyKind::SetOfCi) else {
            panic!("expected set of CIs");
        };
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|ci| ci.ty() == &Type::new("jee.FilterSpec")));
        assert!(set.contains(&filter("x")) && set.contains(&filter("y")));
    }

    #[test]
    fn single_ci_keeps_raw_id() {
        assert_eq!(
            coerce(Some("Infrastructure/ds"), PropertyKind::Ci),
            Some(PropertyValue::Ci(filter("Infrastructure/ds")))
        );
    }

    #[test]
    fn maps() {
        let Some(PropertyValue::MapStringString(map)) =
            coerce(Some("b=1&a=2&c="), PropertyKind::MapStringString)
        else {
            panic!("expected map");
        };
        let entries: Vec<(&str, &str)> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(entries, vec![("b", "1"), ("a", "2"), ("c", "")]);
    }

    #[test]
    fn malformed_map_entries_are_rejected() {
        let map = pd(PropertyKind::MapStringString);
        let malformed = |raw: &str, entry: &str| {
            assert_eq!(
                PropertyCoercer::new().coerce(Some(raw), &map).unwrap_err(),
                CoercionError::MalformedMapEntry {
                    property: "p".into(),
                    entry: entry.into()
                }
            );
        };
        malformed("a=1&oops", "oops");
        malformed("a=1&&b=2", "");
        malformed("a=1&", "");
        malformed("b=x=y", "b=x=y");
    }

    #[test]
    fn repeated_map_key_is_rejected() {
        let err = PropertyCoercer::new()
            .coerce(Some("a=1&a=2"), &pd(PropertyKind::MapStringString))
            .unwrap_err();
        assert_eq!(
            err,
            CoercionError::DuplicateMapKey {
                property: "p".into(),
                key: "a".into()
            }
        );
        assert_eq!(err.to_string(), "duplicate map key 'a' for property 'p'");
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(
            coerce(Some("  /petclinic "), PropertyKind::String),
            Some(PropertyValue::String("  /petclinic ".into()))
        );
    }

    #[test]
    fn ci_kind_without_referenced_type_is_rejected() {
        let bare = PropertyDescriptor::new("servlets", PropertyKind::SetOfCi);
        assert!(matches!(
            PropertyCoercer::new().coerce(Some("x"), &bare),
            Err(CoercionError::MissingReferencedType { .. })
        ));
    }

    proptest! {
        #[test]
        fn list_elements_are_trimmed_and_non_empty(raw in "[a-c ,]{0,24}") {
            let Some(PropertyValue::ListOfString(values)) = coerce(Some(raw.as_str()), PropertyKind::ListOfString) else {
                panic!("expected list");
            };
            for value in &values {
                prop_assert!(!value.is_empty());
                prop_assert_eq!(value.trim(), value.as_str());
                prop_assert!(!value.contains(','));
            }
            let expected: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            prop_assert_eq!(values, expected);
        }

        #[test]
        fn set_holds_distinct_list_elements(raw in "[a-c ,]{0,24}") {
            let Some(PropertyValue::ListOfString(list)) = coerce(Some(raw.as_str()), PropertyKind::ListOfString) else {
                panic!("expected list");
            };
            let Some(PropertyValue::SetOfString(set)) = coerce(Some(raw.as_str()), PropertyKind::SetOfString) else {
                panic!("expected set");
            };
            let distinct: IndexSet<String> = list.into_iter().collect();
            prop_assert_eq!(set, distinct);
        }

        #[test]
        fn ci_list_length_matches_string_list(raw in "[a-z0-9/ ,]{0,32}") {
            let strings = coerce(Some(raw.as_str()), PropertyKind::ListOfString).and_then(|v| v.element_count());
            let cis = coerce(Some(raw.as_str()), PropertyKind::ListOfCi).and_then(|v| v.element_count());
            prop_assert_eq!(strings, cis);
        }

        #[test]
        fn integers_round_trip(n in any::<i32>()) {
            prop_assert_eq!(coerce(Some(n.to_string().as_str()), PropertyKind::Integer), Some(PropertyValue::Integer(n)));
        }
    }
}
