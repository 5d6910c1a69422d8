//! Sorted listings over the deployable descriptors

use crate::catalog::TypeCatalog;
use crate::error::CatalogError;
use crate::predicates::{self, assignable_to, not, or};
use cireg_model::{udm, Descriptor, PropertyDescriptor, Type};
use std::sync::Arc;

/// Read-only queries that drive type and property choices
#[derive(Debug, Clone)]
pub struct DeployableTypeQueries {
    catalog: Arc<TypeCatalog>,
}

impl DeployableTypeQueries {
    /// Create queries over a catalog
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// Deployable types assignable to `udm.Artifact`, sorted
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn deployable_artifact_types(&self) -> Result<Vec<String>, CatalogError> {
        self.deployable_type_names(assignable_to(Type::new(udm::ARTIFACT)))
    }

    /// Deployable types that are neither artifacts nor embedded, sorted
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn deployable_resource_types(&self) -> Result<Vec<String>, CatalogError> {
        self.deployable_type_names(not(or(
            assignable_to(Type::new(udm::ARTIFACT)),
            assignable_to(Type::new(udm::EMBEDDED_DEPLOYABLE)),
        )))
    }

    /// Deployable types assignable to `udm.EmbeddedDeployable`, sorted
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn embedded_deployable_types(&self) -> Result<Vec<String>, CatalogError> {
        self.deployable_type_names(assignable_to(Type::new(udm::EMBEDDED_DEPLOYABLE)))
    }

    /// Names of a type's properties matching `predicate`, sorted
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] for unknown types.
    pub fn properties_for_type<P>(&self, type_name: &str, predicate: P) -> Result<Vec<String>, CatalogError>
    where
        P: Fn(&PropertyDescriptor) -> bool,
    {
        let descriptor = self.catalog.descriptor_by_name(type_name)?;
        Ok(property_names(&descriptor, predicate))
    }

    /// Editable property names of a deployable type, sorted
    ///
    /// Excludes hidden properties, `tags`, and collections of embedded
    /// deployables.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] for unknown types.
    pub fn editable_properties_for_deployable_type(&self, type_name: &str) -> Result<Vec<String>, CatalogError> {
        let snapshot = self.catalog.snapshot()?;
        let descriptor = snapshot.descriptor_by_name(type_name)?;
        Ok(property_names(&descriptor, predicates::editable(snapshot)))
    }

    fn deployable_type_names<P>(&self, predicate: P) -> Result<Vec<String>, CatalogError>
    where
        P: Fn(&Descriptor) -> bool,
    {
        let view = self.catalog.deployable_view()?;
        let mut names: Vec<String> = view
            .descriptors()
            .iter()
            .filter(|descriptor| predicate(Arc::as_ref(descriptor)))
            .map(|descriptor| descriptor.ty().name().to_string())
            .collect();
        names.sort_unstable();
        Ok(names)
    }
}

fn property_names<P>(descriptor: &Descriptor, predicate: P) -> Vec<String>
where
    P: Fn(&PropertyDescriptor) -> bool,
{
    let mut names: Vec<String> = descriptor
        .property_descriptors()
        .iter()
        .filter(|&pd| predicate(pd))
        .map(|pd| pd.name().to_string())
        .collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StaticBackend;
    use crate::config::ConnectionConfig;
    use crate::connection::ConnectionManager;
    use crate::session::SessionRegistry;
    use cireg_model::PropertyKind;

    fn queries() -> DeployableTypeQueries {
        let deployable = Type::new(udm::DEPLOYABLE);
        let descriptors = vec![
            Descriptor::new(deployable.clone()).virtual_type(),
            Descriptor::new(Type::new(udm::ARTIFACT)).with_supertypes([deployable.clone()]).virtual_type(),
            Descriptor::new(Type::new(udm::EMBEDDED_DEPLOYABLE)).virtual_type(),
            Descriptor::new(Type::new("jee.War"))
                .with_supertypes([Type::new(udm::ARTIFACT), deployable.clone()])
                .with_property(PropertyDescriptor::new("tags", PropertyKind::SetOfString))
                .with_property(PropertyDescriptor::new("contextRoot", PropertyKind::String))
                .with_property(PropertyDescriptor::new("checksum", PropertyKind::String).hidden())
                .with_property(
                    PropertyDescriptor::new("servlets", PropertyKind::SetOfCi)
                        .as_containment()
                        .referencing(Type::new("jee.ServletSpec")),
                )
                .with_property(PropertyDescriptor::new("blocking", PropertyKind::Boolean)),
            Descriptor::new(Type::new("jee.DataSourceSpec")).with_supertypes([deployable]),
            Descriptor::new(Type::new("jee.ServletSpec")).with_supertypes([Type::new(udm::EMBEDDED_DEPLOYABLE)]),
            Descriptor::new(Type::new("udm.Environment")),
        ];
        let catalog = TypeCatalog::new(ConnectionManager::new(
            ConnectionConfig::default(),
            Arc::new(StaticBackend::from_descriptors(descriptors)),
            Arc::new(SessionRegistry::new()),
        ));
        DeployableTypeQueries::new(Arc::new(catalog))
    }

    #[test]
    fn type_listings_are_sorted() {
        let q = queries();
        assert_eq!(q.deployable_artifact_types().unwrap(), vec!["jee.War", "udm.Artifact"]);
        assert_eq!(
            q.deployable_resource_types().unwrap(),
            vec!["jee.DataSourceSpec", "udm.Deployable"]
        );
        assert_eq!(
            q.embedded_deployable_types().unwrap(),
            vec!["jee.ServletSpec", "udm.EmbeddedDeployable"]
        );
    }

    #[test]
    fn editable_properties() {
        let q = queries();
        assert_eq!(
            q.editable_properties_for_deployable_type("jee.War").unwrap(),
            vec!["blocking", "contextRoot"]
        );
    }

    #[test]
    fn arbitrary_property_predicate() {
        let q = queries();
        assert_eq!(
            q.properties_for_type("jee.War", |pd| pd.kind().is_ci_collection()).unwrap(),
            vec!["servlets"]
        );
        assert_eq!(
            q.properties_for_type("jee.War", |_| true).unwrap(),
            vec!["blocking", "checksum", "contextRoot", "servlets", "tags"]
        );
        assert!(q.properties_for_type("jee.Missing", |_| true).unwrap_err().is_not_found());
    }
}
