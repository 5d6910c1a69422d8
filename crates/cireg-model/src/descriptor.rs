//! Type descriptors

use crate::property::PropertyDescriptor;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Full metadata for one configuration-item [`Type`]
///
/// `supertypes` is the transitive closure of the type's super classes and
/// interfaces; assignability is answered from it without further lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default)]
    supertypes: BTreeSet<Type>,
    #[serde(default, rename = "virtual")]
    is_virtual: bool,
    #[serde(default)]
    properties: Vec<PropertyDescriptor>,
}

impl Descriptor {
    /// Create concrete descriptor with no supertypes or properties
    #[inline]
    #[must_use]
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            supertypes: BTreeSet::new(),
            is_virtual: false,
            properties: Vec::new(),
        }
    }

    /// Add supertypes (super classes or interfaces)
    #[must_use]
    pub fn with_supertypes<I>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = Type>,
    {
        self.supertypes.extend(supertypes);
        self
    }

    /// Add property; declaration order is preserved
    #[inline]
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Mark as virtual (not instantiable)
    #[inline]
    #[must_use]
    pub fn virtual_type(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Described type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Transitive supertypes
    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &BTreeSet<Type> {
        &self.supertypes
    }

    /// Check if type is virtual
    #[inline]
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Property descriptors in declaration order
    #[inline]
    #[must_use]
    pub fn property_descriptors(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Lookup property descriptor by name
    #[must_use]
    pub fn property_descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|pd| pd.name() == name)
    }

    /// Check if described type is `ty` or one of its subtypes
    #[must_use]
    pub fn is_assignable_to(&self, ty: &Type) -> bool {
        self.ty == *ty || self.supertypes.contains(ty)
    }

    /// First containment collection property whose referenced type is exactly `child`
    #[must_use]
    pub fn embedding_property_for(&self, child: &Type) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|pd| pd.contains_exactly(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;

    fn war() -> Descriptor {
        Descriptor::new(Type::new("jee.War"))
            .with_supertypes([Type::new("udm.Artifact"), Type::new("udm.Deployable")])
            .with_property(PropertyDescriptor::new("contextRoot", PropertyKind::String))
            .with_property(
                PropertyDescriptor::new("servlets", PropertyKind::SetOfCi)
                    .as_containment()
                    .referencing(Type::new("jee.ServletSpec")),
            )
            .with_property(
                PropertyDescriptor::new("moreServlets", PropertyKind::ListOfCi)
                    .as_containment()
                    .referencing(Type::new("jee.ServletSpec")),
            )
    }

    #[test]
    fn assignable_to_self_and_supertypes() {
        let d = war();
        assert!(d.is_assignable_to(&Type::new("jee.War")));
        assert!(d.is_assignable_to(&Type::new("udm.Artifact")));
        assert!(!d.is_assignable_to(&Type::new("udm.EmbeddedDeployable")));
    }

    #[test]
    fn property_lookup_by_name() {
        let d = war();
        assert_eq!(
            d.property_descriptor("contextRoot").map(PropertyDescriptor::kind),
            Some(PropertyKind::String)
        );
        assert!(d.property_descriptor("missing").is_none());
    }

    #[test]
    fn embedding_property_is_first_exact_match() {
        let d = war();
        let pd = d.embedding_property_for(&Type::new("jee.ServletSpec")).unwrap();
        assert_eq!(pd.name(), "servlets");
        assert!(d.embedding_property_for(&Type::new("jee.FilterSpec")).is_none());
    }

    #[test]
    fn deserializes_descriptor_dump_entry() {
        let d: Descriptor = serde_json::from_str(
            r#"{
                "type": "udm.Artifact",
                "virtual": true,
                "supertypes": ["udm.Deployable"],
                "properties": [{"name": "tags", "kind": "SET_OF_STRING"}]
            }"#,
        )
        .unwrap();
        assert!(d.is_virtual());
        assert!(d.is_assignable_to(&Type::new("udm.Deployable")));
        assert_eq!(d.property_descriptors().len(), 1);
    }
}
