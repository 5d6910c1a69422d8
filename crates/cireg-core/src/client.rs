//! Caller-facing descriptor registry client
//!
//! Bundles the catalog, builder, coercer and queries for one connection.

use crate::builder::ConfigurationItemBuilder;
use crate::coerce::PropertyCoercer;
use crate::error::{BuildError, CoercionError};
use cireg_model::{CiClass, ConfigurationItem, Descriptor, PropertyDescriptor, PropertyValue, Type};
use cireg_registry::{
    CatalogError, ConnectionConfig, ConnectionManager, DeployableTypeQueries, RegistryBackend, SessionRegistry,
    TypeCatalog,
};
use std::sync::Arc;

/// Descriptor registry client for one connection configuration
#[derive(Debug, Clone)]
pub struct DescriptorRegistryClient {
    catalog: Arc<TypeCatalog>,
    builder: ConfigurationItemBuilder,
    queries: DeployableTypeQueries,
    coercer: PropertyCoercer,
}

impl DescriptorRegistryClient {
    /// Create client; the session is acquired on first use
    #[must_use]
    pub fn new(config: ConnectionConfig, backend: Arc<dyn RegistryBackend>, sessions: Arc<SessionRegistry>) -> Self {
        Self::from_catalog(Arc::new(TypeCatalog::new(ConnectionManager::new(
            config, backend, sessions,
        ))))
    }

    /// Create client over an existing catalog
    #[must_use]
    pub fn from_catalog(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            builder: ConfigurationItemBuilder::new(Arc::clone(&catalog)),
            queries: DeployableTypeQueries::new(Arc::clone(&catalog)),
            coercer: PropertyCoercer::new(),
            catalog,
        }
    }

    /// Type catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Item builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &ConfigurationItemBuilder {
        &self.builder
    }

    /// Deployable queries
    #[inline]
    #[must_use]
    pub fn queries(&self) -> &DeployableTypeQueries {
        &self.queries
    }

    /// Resolve a type by name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] for unknown names.
    pub fn type_for_name(&self, name: &str) -> Result<Type, CatalogError> {
        self.catalog.lookup_type(name)
    }

    /// Resolve the type bound to `T`
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] if the type is not loaded.
    pub fn type_for<T: CiClass>(&self) -> Result<Type, CatalogError> {
        self.catalog.type_for::<T>()
    }

    /// Descriptor of a type, by name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] if none is loaded.
    pub fn descriptor(&self, type_name: &str) -> Result<Arc<Descriptor>, CatalogError> {
        self.catalog.descriptor_by_name(type_name)
    }

    /// Every loaded descriptor
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn descriptors(&self) -> Result<Vec<Arc<Descriptor>>, CatalogError> {
        self.catalog.all_descriptors()
    }

    /// Build an item from a type name and id
    ///
    /// # Errors
    ///
    /// See [`ConfigurationItemBuilder::build_by_name`].
    pub fn new_instance(&self, type_name: &str, id: &str) -> Result<ConfigurationItem, BuildError> {
        self.builder.build_by_name(type_name, id)
    }

    /// Build an item of the type bound to `T`
    ///
    /// # Errors
    ///
    /// See [`ConfigurationItemBuilder::build_for`].
    pub fn new_instance_for<T: CiClass>(&self, id: &str) -> Result<ConfigurationItem, BuildError> {
        self.builder.build_for::<T>(id)
    }

    /// Coerce a raw string for a property
    ///
    /// # Errors
    ///
    /// See [`PropertyCoercer::coerce`].
    pub fn convert_value(&self, raw: Option<&str>, pd: &PropertyDescriptor) -> Result<Option<PropertyValue>, CoercionError> {
        self.coercer.coerce(raw, pd)
    }

    /// Set one property of `item` from a raw string
    ///
    /// # Errors
    ///
    /// See [`ConfigurationItemBuilder::set_property`].
    pub fn set_property_value(&self, item: &mut ConfigurationItem, name: &str, raw: Option<&str>) -> Result<(), BuildError> {
        self.builder.set_property(item, name, raw)
    }

    /// Embed `child` into `parent`
    ///
    /// # Errors
    ///
    /// See [`ConfigurationItemBuilder::embed`].
    pub fn add_embedded(&self, parent: &mut ConfigurationItem, child: ConfigurationItem) -> Result<(), BuildError> {
        self.builder.embed(parent, child)
    }

    /// Sorted artifact type names
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn deployable_artifact_types(&self) -> Result<Vec<String>, CatalogError> {
        self.queries.deployable_artifact_types()
    }

    /// Sorted resource type names
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn deployable_resource_types(&self) -> Result<Vec<String>, CatalogError> {
        self.queries.deployable_resource_types()
    }

    /// Sorted embedded deployable type names
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn embedded_deployable_types(&self) -> Result<Vec<String>, CatalogError> {
        self.queries.embedded_deployable_types()
    }

    /// Sorted property names of a type matching `predicate`
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] for unknown types.
    pub fn properties_for_type<P>(&self, type_name: &str, predicate: P) -> Result<Vec<String>, CatalogError>
    where
        P: Fn(&PropertyDescriptor) -> bool,
    {
        self.queries.properties_for_type(type_name, predicate)
    }

    /// Sorted editable property names of a deployable type
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] for unknown types.
    pub fn editable_properties_for_deployable_type(&self, type_name: &str) -> Result<Vec<String>, CatalogError> {
        self.queries.editable_properties_for_deployable_type(type_name)
    }

    /// Refetch all type metadata
    ///
    /// # Errors
    ///
    /// See [`TypeCatalog::reload`].
    pub fn reload(&self) -> Result<(), CatalogError> {
        self.catalog.reload()
    }
}
