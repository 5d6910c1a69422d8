//! Configuration-item building and embedding
//!
//! Items leave the builder with every containment CI collection set to an
//! empty collection, never unset. Embedding picks the parent's first
//! containment collection whose referenced type is exactly the child's type.

use crate::coerce::PropertyCoercer;
use crate::error::BuildError;
use cireg_model::{CiClass, ConfigurationItem, Descriptor, PropertyValue, Type};
use cireg_registry::{CatalogError, TypeCatalog};
use std::sync::Arc;

/// Builds configuration items from descriptors
#[derive(Debug, Clone)]
pub struct ConfigurationItemBuilder {
    catalog: Arc<TypeCatalog>,
    coercer: PropertyCoercer,
}

impl ConfigurationItemBuilder {
    /// Create builder over a catalog
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            coercer: PropertyCoercer::new(),
        }
    }

    /// Underlying catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Build an item of `ty` with containment collections initialized
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Instantiation`] carrying type, id and cause for
    /// any failure, including the registry rejecting the type or id.
    pub fn build(&self, ty: &Type, id: &str) -> Result<ConfigurationItem, BuildError> {
        let item = self
            .instantiate(ty, id)
            .map_err(|source| BuildError::instantiation(ty, id, source))?;
        tracing::debug!(key = %self.catalog.connection().masked_key(), item = %item, "Built configuration item");
        Ok(item)
    }

    /// Build an item from a type name
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Catalog`] if the name is unknown, otherwise as
    /// [`build`](Self::build).
    pub fn build_by_name(&self, type_name: &str, id: &str) -> Result<ConfigurationItem, BuildError> {
        let ty = self.catalog.lookup_type(type_name)?;
        self.build(&ty, id)
    }

    /// Build an item of the type bound to `T`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Catalog`] if the type is not loaded, otherwise
    /// as [`build`](Self::build).
    pub fn build_for<T: CiClass>(&self, id: &str) -> Result<ConfigurationItem, BuildError> {
        let ty = self.catalog.type_for::<T>()?;
        self.build(&ty, id)
    }

    fn instantiate(&self, ty: &Type, id: &str) -> Result<ConfigurationItem, CatalogError> {
        let snapshot = self.catalog.snapshot()?;
        let descriptor = snapshot.descriptor(ty)?;
        let mut item = snapshot.instantiate(ty, id)?;
        initialize_containment(&descriptor, &mut item);
        Ok(item)
    }

    /// Coerce `raw` by the property's kind and assign it
    ///
    /// An unset result (absent input, or empty integer) clears the property.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownProperty`] if the item's type has no such
    /// property and [`BuildError::Coercion`] if `raw` does not fit its kind.
    pub fn set_property(&self, item: &mut ConfigurationItem, name: &str, raw: Option<&str>) -> Result<(), BuildError> {
        let descriptor = self.catalog.descriptor(item.ty())?;
        let pd = descriptor
            .property_descriptor(name)
            .ok_or_else(|| BuildError::UnknownProperty {
                ty: item.ty().clone(),
                property: name.to_string(),
            })?;
        let value = self.coercer.coerce(raw, pd)?;
        pd.set(item, value);
        Ok(())
    }

    /// Add `child` to the parent's containment collection for its exact type
    ///
    /// Lists append; sets absorb identity-equal children.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoEmbeddingProperty`] naming parent and child if
    /// no property matches, and [`BuildError::IncompatibleCollection`] if the
    /// matching property holds a non-collection value. The parent is left
    /// unmodified on error.
    pub fn embed(&self, parent: &mut ConfigurationItem, child: ConfigurationItem) -> Result<(), BuildError> {
        let descriptor = self.catalog.descriptor(parent.ty())?;
        let pd = descriptor
            .embedding_property_for(child.ty())
            .ok_or_else(|| BuildError::NoEmbeddingProperty {
                parent: parent.to_string(),
                child: child.to_string(),
            })?;

        let parent_name = parent.to_string();
        let incompatible = || BuildError::IncompatibleCollection {
            parent: parent_name.clone(),
            property: pd.name().to_string(),
        };
        match pd.get(parent) {
            Some(value) if !value.is_ci_collection() => return Err(incompatible()),
            Some(_) => {}
            None => pd.set(parent, pd.kind().empty_ci_collection()),
        }

        tracing::debug!(
            key = %self.catalog.connection().masked_key(),
            parent = %parent,
            child = %child,
            property = pd.name(),
            "Embedding configuration item"
        );
        match parent.property_mut(pd.name()) {
            Some(PropertyValue::ListOfCi(items)) => items.push(child),
            Some(PropertyValue::SetOfCi(items)) => {
                items.insert(child);
            }
            _ => return Err(incompatible()),
        }
        Ok(())
    }
}

/// Set every unset containment CI collection of `item` to an empty collection
pub fn initialize_containment(descriptor: &Descriptor, item: &mut ConfigurationItem) {
    for pd in descriptor.property_descriptors() {
        if !pd.is_as_containment() || pd.get(item).is_some() {
            continue;
        }
        if let Some(empty) = pd.kind().empty_ci_collection() {
            pd.set(item, Some(empty));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cireg_model::{PropertyDescriptor, PropertyKind};
    use cireg_registry::{ConnectionConfig, ConnectionManager, SessionRegistry, StaticBackend};
    use indexmap::IndexSet;

    fn builder() -> ConfigurationItemBuilder {
        let descriptors = vec![
            Descriptor::new(Type::new("udm.Deployable")).virtual_type(),
            Descriptor::new(Type::new("jee.War"))
                .with_supertypes([Type::new("udm.Deployable")])
                .with_property(PropertyDescriptor::new("contextRoot", PropertyKind::String))
                .with_property(
                    PropertyDescriptor::new("filters", PropertyKind::ListOfCi)
                        .as_containment()
                        .referencing(Type::new("jee.FilterSpec")),
                )
                .with_property(
                    PropertyDescriptor::new("servlets", PropertyKind::SetOfCi)
                        .as_containment()
                        .referencing(Type::new("jee.ServletSpec")),
                )
                .with_property(PropertyDescriptor::new("tags", PropertyKind::SetOfString).as_containment()),
            Descriptor::new(Type::new("jee.FilterSpec")),
            Descriptor::new(Type::new("jee.ServletSpec")),
        ];
        let catalog = TypeCatalog::new(ConnectionManager::new(
            ConnectionConfig::default(),
            Arc::new(StaticBackend::from_descriptors(descriptors)),
            Arc::new(SessionRegistry::new()),
        ));
        ConfigurationItemBuilder::new(Arc::new(catalog))
    }

    #[test]
    fn build_initializes_containment_collections_only() {
        let item = builder().build(&Type::new("jee.War"), "app").unwrap();
        assert_eq!(item.property("filters"), Some(&PropertyValue::ListOfCi(Vec::new())));
        assert_eq!(item.property("servlets"), Some(&PropertyValue::SetOfCi(IndexSet::new())));
        assert!(item.property("tags").is_none());
        assert!(item.property("contextRoot").is_none());
    }

    #[test]
    fn initialization_keeps_existing_values() {
        let b = builder();
        let descriptor = b.catalog().descriptor(&Type::new("jee.War")).unwrap();
        let mut item = ConfigurationItem::new(Type::new("jee.War"), "app");
        let filter = ConfigurationItem::reference(Type::new("jee.FilterSpec"), "f");
        item.set_property("filters", Some(PropertyValue::ListOfCi(vec![filter.clone()])));

        initialize_containment(&descriptor, &mut item);
        assert_eq!(item.property("filters"), Some(&PropertyValue::ListOfCi(vec![filter])));
    }

    #[test]
    fn rejected_instantiation_is_wrapped() {
        let b = builder();
        for (ty, id) in [("udm.Deployable", "x"), ("jee.War", ""), ("jee.Unloaded", "x")] {
            match b.build(&Type::new(ty), id) {
                Err(BuildError::Instantiation { ty: failed, id: failed_id, .. }) => {
                    assert_eq!(failed.name(), ty);
                    assert_eq!(failed_id, id);
                }
                other => panic!("expected instantiation failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn build_by_unknown_name_is_not_found() {
        let err = builder().build_by_name("jee.Unloaded", "x").unwrap_err();
        assert!(matches!(err, BuildError::Catalog(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn set_property_coerces_and_clears() {
        let b = builder();
        let mut item = b.build_by_name("jee.War", "app").unwrap();

        b.set_property(&mut item, "contextRoot", Some("/app")).unwrap();
        assert_eq!(item.property("contextRoot"), Some(&PropertyValue::String("/app".into())));

        b.set_property(&mut item, "contextRoot", None).unwrap();
        assert!(item.property("contextRoot").is_none());

        assert!(matches!(
            b.set_property(&mut item, "nope", Some("x")),
            Err(BuildError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn embed_into_list_appends() {
        let b = builder();
        let mut war = b.build_by_name("jee.War", "app").unwrap();
        let filter = ConfigurationItem::new(Type::new("jee.FilterSpec"), "app/f");
        b.embed(&mut war, filter.clone()).unwrap();
        b.embed(&mut war, filter.clone()).unwrap();
        assert_eq!(war.property("filters").and_then(PropertyValue::element_count), Some(2));
    }

    #[test]
    fn embed_initializes_unset_collection() {
        let b = builder();
        let mut war = ConfigurationItem::new(Type::new("jee.War"), "app");
        b.embed(&mut war, ConfigurationItem::new(Type::new("jee.ServletSpec"), "s")).unwrap();
        assert_eq!(war.property("servlets").and_then(PropertyValue::element_count), Some(1));
    }

    #[test]
    fn embed_rejects_non_collection_value() {
        let b = builder();
        let mut war = ConfigurationItem::new(Type::new("jee.War"), "app");
        war.set_property("servlets", Some(PropertyValue::String("oops".into())));
        let err = b
            .embed(&mut war, ConfigurationItem::new(Type::new("jee.ServletSpec"), "s"))
            .unwrap_err();
        assert!(matches!(err, BuildError::IncompatibleCollection { .. }));
        assert_eq!(war.property("servlets"), Some(&PropertyValue::String("oops".into())));
    }
}
