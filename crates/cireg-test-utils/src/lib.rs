//! Testing utilities for CIREG workspace
//!
//! Shared fixture schema, backends, and catalog setup.

#![allow(missing_docs)]

use cireg_model::{udm, Descriptor, PropertyDescriptor, PropertyKind, Type};
use cireg_registry::{
    ConnectionConfig, ConnectionManager, RegistryBackend, RemoteSession, SessionError, SessionRegistry,
    StaticBackend, TypeCatalog,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CONFIGURATION_ITEM: &str = "udm.ConfigurationItem";
pub const WAR: &str = "jee.War";
pub const EAR: &str = "jee.Ear";
pub const DATA_SOURCE: &str = "jee.DataSourceSpec";
pub const SERVLET: &str = "jee.ServletSpec";
pub const FILTER: &str = "jee.FilterSpec";
pub const ENVIRONMENT: &str = "udm.Environment";
pub const HOST: &str = "overthere.Host";

fn ty(name: &str) -> Type {
    Type::new(name)
}

fn prop(name: &str, kind: PropertyKind) -> PropertyDescriptor {
    PropertyDescriptor::new(name, kind)
}

fn artifact_supertypes() -> [Type; 3] {
    [ty(udm::ARTIFACT), ty(udm::DEPLOYABLE), ty(CONFIGURATION_ITEM)]
}

fn embedded_supertypes() -> [Type; 2] {
    [ty(udm::EMBEDDED_DEPLOYABLE), ty(CONFIGURATION_ITEM)]
}

/// Deployment model fixture
///
/// Artifacts: `jee.Ear`, `jee.War` (plus virtual `udm.Artifact`).
/// Resources: `jee.DataSourceSpec` (plus virtual `udm.Deployable`).
/// Embedded: `jee.FilterSpec`, `jee.ServletSpec` (plus virtual `udm.EmbeddedDeployable`).
/// Not deployable: `udm.ConfigurationItem`, `udm.Environment`, `overthere.Host`.
#[must_use]
pub fn udm_descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(ty(CONFIGURATION_ITEM)).virtual_type(),
        Descriptor::new(ty(udm::DEPLOYABLE))
            .with_supertypes([ty(CONFIGURATION_ITEM)])
            .with_property(prop(udm::TAGS_PROPERTY, PropertyKind::SetOfString))
            .virtual_type(),
        Descriptor::new(ty(udm::ARTIFACT))
            .with_supertypes([ty(udm::DEPLOYABLE), ty(CONFIGURATION_ITEM)])
            .with_property(prop(udm::TAGS_PROPERTY, PropertyKind::SetOfString))
            .virtual_type(),
        Descriptor::new(ty(udm::EMBEDDED_DEPLOYABLE))
            .with_supertypes([ty(CONFIGURATION_ITEM)])
            .virtual_type(),
        Descriptor::new(ty(WAR))
            .with_supertypes(artifact_supertypes())
            .with_property(prop("contextRoot", PropertyKind::String))
            .with_property(prop(udm::TAGS_PROPERTY, PropertyKind::SetOfString))
            .with_property(prop("checksum", PropertyKind::String).hidden())
            .with_property(prop("preCompile", PropertyKind::Boolean))
            .with_property(prop("startupOrder", PropertyKind::Integer))
            .with_property(prop("deploymentMode", PropertyKind::Enum))
            .with_property(
                prop("servlets", PropertyKind::SetOfCi)
                    .as_containment()
                    .referencing(ty(SERVLET)),
            )
            .with_property(
                prop("filters", PropertyKind::ListOfCi)
                    .as_containment()
                    .referencing(ty(FILTER)),
            )
            .with_property(prop("dependsOn", PropertyKind::ListOfCi).referencing(ty(WAR)))
            .with_property(prop("dataSource", PropertyKind::Ci).referencing(ty(DATA_SOURCE)))
            .with_property(prop("classpath", PropertyKind::ListOfString))
            .with_property(prop("placeholders", PropertyKind::MapStringString)),
        Descriptor::new(ty(EAR))
            .with_supertypes(artifact_supertypes())
            .with_property(prop("displayName", PropertyKind::String))
            .with_property(
                prop("modules", PropertyKind::ListOfCi)
                    .as_containment()
                    .referencing(ty(WAR)),
            ),
        Descriptor::new(ty(DATA_SOURCE))
            .with_supertypes([ty(udm::DEPLOYABLE), ty(CONFIGURATION_ITEM)])
            .with_property(prop("jndiName", PropertyKind::String))
            .with_property(prop("password", PropertyKind::String).hidden())
            .with_property(prop("maxPoolSize", PropertyKind::Integer))
            .with_property(prop("connectionProperties", PropertyKind::MapStringString))
            .with_property(prop(udm::TAGS_PROPERTY, PropertyKind::SetOfString)),
        Descriptor::new(ty(SERVLET))
            .with_supertypes(embedded_supertypes())
            .with_property(prop("servletName", PropertyKind::String))
            .with_property(prop("urlPatterns", PropertyKind::ListOfString)),
        Descriptor::new(ty(FILTER))
            .with_supertypes(embedded_supertypes())
            .with_property(prop("filterName", PropertyKind::String)),
        Descriptor::new(ty(ENVIRONMENT))
            .with_supertypes([ty(CONFIGURATION_ITEM)])
            .with_property(prop("members", PropertyKind::SetOfCi).referencing(ty(HOST))),
        Descriptor::new(ty(HOST))
            .with_supertypes([ty(CONFIGURATION_ITEM)])
            .with_property(prop("address", PropertyKind::String))
            .with_property(prop("port", PropertyKind::Integer)),
    ]
}

/// Backend serving [`udm_descriptors`]
#[must_use]
pub fn udm_backend() -> StaticBackend {
    StaticBackend::from_descriptors(udm_descriptors())
}

/// Connection config with a recognizable password
#[must_use]
pub fn test_config() -> ConnectionConfig {
    ConnectionConfig::new()
        .with_host("deploy.test")
        .with_credentials("admin", "s3cret")
}

/// Catalog over `backend` with its own session registry
#[must_use]
pub fn catalog_with(backend: Arc<dyn RegistryBackend>) -> Arc<TypeCatalog> {
    catalog_sharing(backend, Arc::new(SessionRegistry::new()))
}

/// Catalog over `backend` sharing an existing session registry
#[must_use]
pub fn catalog_sharing(backend: Arc<dyn RegistryBackend>, sessions: Arc<SessionRegistry>) -> Arc<TypeCatalog> {
    Arc::new(TypeCatalog::new(ConnectionManager::new(test_config(), backend, sessions)))
}

/// Catalog over the fixture schema
#[must_use]
pub fn udm_catalog() -> Arc<TypeCatalog> {
    catalog_with(Arc::new(udm_backend()))
}

/// Backend that counts bootstraps and closed sessions, and can refuse the
/// next few bootstraps
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: StaticBackend,
    bootstraps: AtomicUsize,
    failures_left: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl CountingBackend {
    #[must_use]
    pub fn new(inner: StaticBackend) -> Self {
        Self {
            inner,
            bootstraps: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counting backend over the fixture schema
    #[must_use]
    pub fn udm() -> Self {
        Self::new(udm_backend())
    }

    /// Refuse the next `count` bootstraps with a connectivity error
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of bootstrap attempts, successful or not
    #[must_use]
    pub fn bootstraps(&self) -> usize {
        self.bootstraps.load(Ordering::SeqCst)
    }

    /// Number of sessions closed after losing registration
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wrapped static backend
    #[must_use]
    pub fn inner(&self) -> &StaticBackend {
        &self.inner
    }
}

impl RegistryBackend for CountingBackend {
    fn bootstrap(&self, config: &ConnectionConfig) -> Result<Arc<dyn RemoteSession>, SessionError> {
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(SessionError::bootstrap(config.masked_key(), "connection refused"));
        }
        Ok(Arc::new(CountingSession {
            inner: self.inner.bootstrap(config)?,
            closed: Arc::clone(&self.closed),
        }))
    }
}

#[derive(Debug)]
struct CountingSession {
    inner: Arc<dyn RemoteSession>,
    closed: Arc<AtomicUsize>,
}

impl RemoteSession for CountingSession {
    fn fetch_descriptors(&self) -> Result<Vec<Descriptor>, SessionError> {
        self.inner.fetch_descriptors()
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close();
    }
}
