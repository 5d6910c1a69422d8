//! Property kinds and property descriptors

use crate::item::{ConfigurationItem, PropertyValue};
use crate::types::Type;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Closed set of value shapes a property may hold
///
/// Determines both how raw strings are coerced and which properties are
/// collection-initialized when an item is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    /// `true`/`false`
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// Free text
    #[default]
    String,
    /// One of a fixed set of literals, carried as text
    Enum,
    /// Single cross-reference to another configuration item
    Ci,
    /// Unordered unique strings
    SetOfString,
    /// Ordered strings, duplicates allowed
    ListOfString,
    /// Unordered unique cross-references
    SetOfCi,
    /// Ordered cross-references, duplicates allowed
    ListOfCi,
    /// String-to-string mapping
    MapStringString,
}

impl PropertyKind {
    /// Check if kind holds cross-references (single or collection)
    #[inline]
    #[must_use]
    pub fn references_ci(self) -> bool {
        matches!(self, Self::Ci | Self::SetOfCi | Self::ListOfCi)
    }

    /// Check if kind is a collection of cross-references
    #[inline]
    #[must_use]
    pub fn is_ci_collection(self) -> bool {
        matches!(self, Self::SetOfCi | Self::ListOfCi)
    }

    /// Empty collection for CI-collection kinds, `None` for everything else
    #[must_use]
    pub fn empty_ci_collection(self) -> Option<PropertyValue> {
        match self {
            Self::ListOfCi => Some(PropertyValue::ListOfCi(Vec::new())),
            Self::SetOfCi => Some(PropertyValue::SetOfCi(IndexSet::new())),
            _ => None,
        }
    }
}

/// Metadata for one property of a [`Type`]
///
/// Fields are immutable once constructed: a descriptor loaded from the
/// registry never changes kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    name: String,
    #[serde(default)]
    kind: PropertyKind,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    as_containment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    referenced_type: Option<Type>,
}

impl PropertyDescriptor {
    /// Create visible, non-containment property of given kind
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hidden: false,
            as_containment: false,
            referenced_type: None,
        }
    }

    /// Mark as hidden
    #[inline]
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark as containment (values are owned by the holding item)
    #[inline]
    #[must_use]
    pub fn as_containment(mut self) -> Self {
        self.as_containment = true;
        self
    }

    /// Set referenced type for CI-kinded properties
    #[inline]
    #[must_use]
    pub fn referencing(mut self, ty: Type) -> Self {
        self.referenced_type = Some(ty);
        self
    }

    /// Property name, unique within its owning type
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Check if property is hidden from editors
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Check if property is a containment property
    #[inline]
    #[must_use]
    pub fn is_as_containment(&self) -> bool {
        self.as_containment
    }

    /// Referenced type for CI-kinded properties
    #[inline]
    #[must_use]
    pub fn referenced_type(&self) -> Option<&Type> {
        self.referenced_type.as_ref()
    }

    /// Check if property is a containment collection of CIs
    #[inline]
    #[must_use]
    pub fn is_containment_collection(&self) -> bool {
        self.as_containment && self.kind.is_ci_collection()
    }

    /// Check if property is a containment collection of exactly `ty`
    ///
    /// Exact type equality, not assignability.
    #[must_use]
    pub fn contains_exactly(&self, ty: &Type) -> bool {
        self.is_containment_collection() && self.referenced_type.as_ref() == Some(ty)
    }

    /// Current value of this property on `item`, `None` when unset
    #[inline]
    #[must_use]
    pub fn get<'a>(&self, item: &'a ConfigurationItem) -> Option<&'a PropertyValue> {
        item.property(&self.name)
    }

    /// Assign (or clear, with `None`) this property on `item`
    #[inline]
    pub fn set(&self, item: &mut ConfigurationItem, value: Option<PropertyValue>) {
        item.set_property(&self.name, value);
    }
}
