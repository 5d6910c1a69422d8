//! Read-through type catalog
//!
//! Resolves types and descriptors through the descriptor registry
//! associated with a connection, acquiring the session on first use.
//! Memoizes the deployable subset of descriptors until the next
//! [`reload`](TypeCatalog::reload).

use crate::connection::{ConnectionManager, SessionGuard};
use crate::descriptors::{DescriptorRegistry, DescriptorSnapshot};
use crate::error::{CatalogError, SessionError};
use crate::predicates::{assignable_to, or};
use cireg_model::{udm, CiClass, ConfigurationItem, Descriptor, Type};
use parking_lot::Mutex;
use std::sync::Arc;

/// Deployable descriptors computed from one snapshot
#[derive(Debug)]
pub struct DeployableView {
    snapshot: Arc<DescriptorSnapshot>,
    descriptors: Vec<Arc<Descriptor>>,
}

impl DeployableView {
    fn compute(snapshot: Arc<DescriptorSnapshot>) -> Self {
        let deployable = or(
            assignable_to(Type::new(udm::DEPLOYABLE)),
            assignable_to(Type::new(udm::EMBEDDED_DEPLOYABLE)),
        );
        let descriptors = snapshot
            .descriptors()
            .filter(|descriptor| deployable(Arc::as_ref(descriptor)))
            .cloned()
            .collect();
        Self { snapshot, descriptors }
    }

    /// Snapshot the view was computed from
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Arc<DescriptorSnapshot> {
        &self.snapshot
    }

    /// Descriptors assignable to `udm.Deployable` or `udm.EmbeddedDeployable`
    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<Descriptor>] {
        &self.descriptors
    }
}

/// Type and descriptor access for one connection
#[derive(Debug)]
pub struct TypeCatalog {
    connection: ConnectionManager,
    // Only locked while holding the connection guard.
    deployables: Mutex<Option<Arc<DeployableView>>>,
}

impl TypeCatalog {
    /// Create catalog over a connection
    #[must_use]
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            deployables: Mutex::new(None),
        }
    }

    /// Underlying connection manager
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    fn registry(&self) -> Result<Arc<DescriptorRegistry>, SessionError> {
        let config = self.connection.config();
        if let Some(registry) = self.connection.sessions().registry_for(config) {
            return Ok(registry);
        }
        let mut guard = self.connection.lock();
        registry_locked(&mut guard)
    }

    /// Current descriptor snapshot
    ///
    /// Use one snapshot for a sequence of reads that must agree with each
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn snapshot(&self) -> Result<Arc<DescriptorSnapshot>, CatalogError> {
        Ok(self.registry()?.snapshot())
    }

    /// Resolve a type by name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] for unknown names.
    pub fn lookup_type(&self, name: &str) -> Result<Type, CatalogError> {
        self.snapshot()?.lookup_type(name)
    }

    /// Resolve the type bound to `T`
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TypeNotFound`] if the type is not loaded.
    pub fn type_for<T: CiClass>(&self) -> Result<Type, CatalogError> {
        self.snapshot()?.type_for::<T>()
    }

    /// Descriptor of a type
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] if none is loaded.
    pub fn descriptor(&self, ty: &Type) -> Result<Arc<Descriptor>, CatalogError> {
        self.snapshot()?.descriptor(ty)
    }

    /// Descriptor of a type, by name
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DescriptorNotFound`] if none is loaded.
    pub fn descriptor_by_name(&self, name: &str) -> Result<Arc<Descriptor>, CatalogError> {
        self.snapshot()?.descriptor_by_name(name)
    }

    /// Every loaded descriptor, in load order
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn all_descriptors(&self) -> Result<Vec<Arc<Descriptor>>, CatalogError> {
        Ok(self.snapshot()?.descriptors().cloned().collect())
    }

    /// Ask the registry for a bare item
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InstantiationRejected`] for virtual types or
    /// empty ids.
    pub fn instantiate(&self, ty: &Type, id: &str) -> Result<ConfigurationItem, CatalogError> {
        self.snapshot()?.instantiate(ty, id)
    }

    /// Deployable descriptors, computed once per registry snapshot
    ///
    /// Recomputed after a reload through this catalog or any other catalog
    /// sharing the same registry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if no session can be acquired.
    pub fn deployable_view(&self) -> Result<Arc<DeployableView>, CatalogError> {
        let mut guard = self.connection.lock();
        let mut cached = self.deployables.lock();
        let snapshot = registry_locked(&mut guard)?.snapshot();
        // The registry is shared per key; another catalog may have rebound it.
        if let Some(view) = cached.as_ref().filter(|view| Arc::ptr_eq(view.snapshot(), &snapshot)) {
            return Ok(Arc::clone(view));
        }

        let view = Arc::new(DeployableView::compute(snapshot));
        tracing::debug!(
            key = %self.connection.masked_key(),
            count = view.descriptors().len(),
            "Computed deployable descriptors"
        );
        *cached = Some(Arc::clone(&view));
        Ok(view)
    }

    /// Refetch every descriptor through the session and drop the
    /// deployable cache
    ///
    /// Runs entirely under the connection lock.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Session`] if the session cannot be acquired
    /// or the refetch fails; the previous descriptors stay in effect.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let mut guard = self.connection.lock();
        let mut cached = self.deployables.lock();
        tracing::warn!(key = %self.connection.masked_key(), "About to reload descriptor registry");

        let session = guard.session()?;
        let registry = registry_locked(&mut guard)?;
        registry.rebind(session.remote())?;
        *cached = None;
        Ok(())
    }
}

fn registry_locked(guard: &mut SessionGuard<'_>) -> Result<Arc<DescriptorRegistry>, SessionError> {
    let session = guard.session()?;
    let manager = guard.manager();
    manager.sessions().registry_or_load(manager.config(), &session)
}
