//! Configuration items and property values

use crate::types::Type;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Typed value of one property
///
/// One variant per [`PropertyKind`](crate::PropertyKind) value shape;
/// `Enum` values are carried as `String`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag
    Boolean(bool),
    /// Integer
    Integer(i32),
    /// Text (also used for enum literals)
    String(String),
    /// Single cross-reference
    Ci(ConfigurationItem),
    /// Unique strings, insertion-ordered
    SetOfString(IndexSet<String>),
    /// Ordered strings
    ListOfString(Vec<String>),
    /// Unique cross-references, insertion-ordered
    SetOfCi(IndexSet<ConfigurationItem>),
    /// Ordered cross-references
    ListOfCi(Vec<ConfigurationItem>),
    /// String mapping, insertion-ordered
    MapStringString(IndexMap<String, String>),
}

impl PropertyValue {
    /// Check if value is a collection of cross-references
    #[inline]
    #[must_use]
    pub fn is_ci_collection(&self) -> bool {
        matches!(self, Self::SetOfCi(_) | Self::ListOfCi(_))
    }

    /// Number of elements for collection values, `None` for scalars
    #[must_use]
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Self::SetOfString(values) => Some(values.len()),
            Self::ListOfString(values) => Some(values.len()),
            Self::SetOfCi(items) => Some(items.len()),
            Self::ListOfCi(items) => Some(items.len()),
            Self::MapStringString(entries) => Some(entries.len()),
            Self::Boolean(_) | Self::Integer(_) | Self::String(_) | Self::Ci(_) => None,
        }
    }

    /// Cross-referenced items held by this value, in iteration order
    #[must_use]
    pub fn ci_items(&self) -> Vec<&ConfigurationItem> {
        match self {
            Self::Ci(item) => vec![item],
            Self::SetOfCi(items) => items.iter().collect(),
            Self::ListOfCi(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Mutable, identified instance of some [`Type`]
///
/// Identity is `(type, id)`: equality and hashing ignore property values, so
/// a set of items absorbs identity-equal duplicates. A *reference value* is
/// an item carrying only identity, used as a stand-in for cross-references.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationItem {
    id: String,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, PropertyValue>,
}

impl ConfigurationItem {
    /// Create bare item with no properties set
    #[inline]
    #[must_use]
    pub fn new(ty: Type, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ty,
            properties: BTreeMap::new(),
        }
    }

    /// Create reference value (identity only, never resolved)
    #[inline]
    #[must_use]
    pub fn reference(ty: Type, id: impl Into<String>) -> Self {
        Self::new(ty, id)
    }

    /// Item id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Current value of a property, `None` when unset
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Mutable access to a property value
    #[inline]
    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.properties.get_mut(name)
    }

    /// Check if property is set
    #[inline]
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Assign a property; `None` unsets it
    pub fn set_property(&mut self, name: &str, value: Option<PropertyValue>) {
        match value {
            Some(value) => {
                self.properties.insert(name.to_owned(), value);
            }
            None => {
                self.properties.remove(name);
            }
        }
    }

    /// Iterate over set properties in name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl PartialEq for ConfigurationItem {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.id == other.id
    }
}

impl Eq for ConfigurationItem {}

impl Hash for ConfigurationItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for ConfigurationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.ty, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn war(id: &str) -> ConfigurationItem {
        ConfigurationItem::new(Type::new("jee.War"), id)
    }

    #[test]
    fn identity_ignores_properties() {
        let mut a = war("app");
        let b = war("app");
        a.set_property("contextRoot", Some(PropertyValue::String("/a".into())));
        assert_eq!(a, b);

        let other_type = ConfigurationItem::new(Type::new("jee.Ear"), "app");
        assert_ne!(a, other_type);
    }

    #[test]
    fn set_of_ci_absorbs_identity_equal_items() {
        let mut set = IndexSet::new();
        assert!(set.insert(war("app")));
        assert!(!set.insert(war("app")));
        assert!(set.insert(war("other")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_and_clear_property() {
        let mut item = war("app");
        item.set_property("tags", Some(PropertyValue::SetOfString(IndexSet::new())));
        assert!(item.has_property("tags"));
        item.set_property("tags", None);
        assert!(!item.has_property("tags"));
    }

    #[test]
    fn value_lengths() {
        assert_eq!(PropertyValue::Boolean(true).element_count(), None);
        assert_eq!(
            PropertyValue::ListOfString(vec!["a".into(), "a".into()]).element_count(),
            Some(2)
        );
        assert_eq!(PropertyValue::ListOfCi(vec![war("x")]).element_count(), Some(1));
    }

    #[test]
    fn ci_items_lists_references() {
        let value = PropertyValue::ListOfCi(vec![war("a"), war("b")]);
        let ids: Vec<&str> = value.ci_items().iter().map(|ci| ci.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(PropertyValue::String("x".into()).ci_items().is_empty());
    }

    #[test]
    fn display_names_type_and_id() {
        assert_eq!(war("app").to_string(), "jee.War 'app'");
    }

    #[test]
    fn serializes_nested_values() {
        let mut item = war("app");
        item.set_property("enabled", Some(PropertyValue::Boolean(true)));
        item.set_property(
            "filters",
            Some(PropertyValue::ListOfCi(vec![ConfigurationItem::reference(
                Type::new("jee.FilterSpec"),
                "f1",
            )])),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "app");
        assert_eq!(json["type"], "jee.War");
        assert_eq!(json["properties"]["enabled"], true);
        assert_eq!(json["properties"]["filters"][0]["id"], "f1");
    }
}
