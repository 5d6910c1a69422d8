//! Descriptor snapshots and the per-key descriptor registry
//!
//! A [`DescriptorSnapshot`] is an immutable, validated view of one
//! descriptor set. A [`DescriptorRegistry`] holds the current snapshot for
//! one configuration key and swaps it atomically on
//! [`rebind`](DescriptorRegistry::rebind). Readers clone the `Arc` once per
//! call and never see a half-replaced set.

use crate::backend::RemoteSession;
use crate::error::{CatalogError, SchemaError, SessionError};
use cireg_model::{CiClass, ConfigurationItem, Descriptor, Type};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Immutable descriptor set, keyed by type
#[derive(Debug, Default)]
pub struct DescriptorSnapshot {
    descriptors: IndexMap<Type, Arc<Descriptor>>,
}

impl DescriptorSnapshot {
    /// Validate and index a descriptor set
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on duplicate types, duplicate property names
    /// within a type, or CI-kinded properties lacking a referenced type.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        let mut indexed = IndexMap::new();
        for descriptor in descriptors {
            validate(&descriptor)?;
            let ty = descriptor.ty().clone();
            if indexed.contains_key(&ty) {
                return Err(SchemaError::DuplicateType(ty));
            }
            indexed.insert(ty, Arc::new(descriptor));
        }
        Ok(Self { descriptors: indexed })
    }

    /// Number of loaded types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if no types are loaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve a type name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] if no such type is loaded.
    pub fn lookup_type(&self, name: &str) -> Result<Type, CatalogError> {
        self.descriptors
            .get_key_value(name)
            .map(|(ty, _)| ty.clone())
            .ok_or_else(|| CatalogError::TypeNotFound(name.to_string()))
    }

    /// Resolve the type bound to `T`
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] if `T::TYPE_NAME` is not loaded.
    pub fn type_for<T: CiClass>(&self) -> Result<Type, CatalogError> {
        self.lookup_type(T::TYPE_NAME)
    }

    /// Descriptor of a type
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] if no descriptor is loaded.
    pub fn descriptor(&self, ty: &Type) -> Result<Arc<Descriptor>, CatalogError> {
        self.descriptors
            .get(ty)
            .cloned()
            .ok_or_else(|| CatalogError::DescriptorNotFound(ty.clone()))
    }

    /// Descriptor of a type, by name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] if no descriptor is loaded.
    pub fn descriptor_by_name(&self, name: &str) -> Result<Arc<Descriptor>, CatalogError> {
        self.descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::DescriptorNotFound(Type::new(name)))
    }

    /// All descriptors in load order
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.descriptors.values()
    }

    /// Check if `ty` is `ancestor` or one of its subtypes
    ///
    /// Unknown types are assignable to nothing but themselves.
    #[must_use]
    pub fn is_subtype(&self, ty: &Type, ancestor: &Type) -> bool {
        ty == ancestor
            || self
                .descriptors
                .get(ty)
                .is_some_and(|descriptor| descriptor.is_assignable_to(ancestor))
    }

    /// Create a bare item of `ty` with the given id
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] for unknown types and
    /// [`CatalogError::InstantiationRejected`] for virtual types or empty ids.
    pub fn instantiate(&self, ty: &Type, id: &str) -> Result<ConfigurationItem, CatalogError> {
        let descriptor = self.descriptor(ty)?;
        let rejected = |reason: &str| CatalogError::InstantiationRejected {
            ty: ty.clone(),
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if descriptor.is_virtual() {
            return Err(rejected("type is virtual"));
        }
        if id.is_empty() {
            return Err(rejected("id is empty"));
        }
        Ok(ConfigurationItem::new(ty.clone(), id))
    }
}

fn validate(descriptor: &Descriptor) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for pd in descriptor.property_descriptors() {
        if !names.insert(pd.name()) {
            return Err(SchemaError::DuplicateProperty {
                ty: descriptor.ty().clone(),
                property: pd.name().to_string(),
            });
        }
        if pd.kind().references_ci() && pd.referenced_type().is_none() {
            return Err(SchemaError::MissingReferencedType {
                ty: descriptor.ty().clone(),
                property: pd.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Descriptor source bound to one configuration key
#[derive(Debug)]
pub struct DescriptorRegistry {
    snapshot: RwLock<Arc<DescriptorSnapshot>>,
}

impl DescriptorRegistry {
    /// Load the descriptor set served by `session`
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the fetch fails or the set is invalid.
    pub fn load(session: &dyn RemoteSession) -> Result<Self, SessionError> {
        Ok(Self {
            snapshot: RwLock::new(Arc::new(fetch(session)?)),
        })
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<DescriptorSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Refetch through `session` and swap the snapshot
    ///
    /// On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the fetch fails or the set is invalid.
    pub fn rebind(&self, session: &dyn RemoteSession) -> Result<(), SessionError> {
        let fresh = Arc::new(fetch(session)?);
        *self.snapshot.write() = fresh;
        Ok(())
    }
}

fn fetch(session: &dyn RemoteSession) -> Result<DescriptorSnapshot, SessionError> {
    let descriptors = session.fetch_descriptors()?;
    Ok(DescriptorSnapshot::from_descriptors(descriptors)?)
}
