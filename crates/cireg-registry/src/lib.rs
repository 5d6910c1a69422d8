//! CIREG Registry
//!
//! Session lifecycle and type catalog over a remote descriptor registry.
//!
//! # Components
//!
//! - [`ConnectionConfig`]: endpoint and credentials, with a masked key for diagnostics
//! - [`RegistryBackend`] / [`RemoteSession`]: the remote collaborator seam
//! - [`SessionRegistry`]: process-wide keyed store of sessions and descriptor registries
//! - [`ConnectionManager`]: lazy, lock-guarded reuse-or-recreate session acquisition
//! - [`TypeCatalog`]: read-through descriptor access with a memoized deployable view
//! - [`DeployableTypeQueries`]: sorted type and property listings
//!
//! # Example
//!
//! ```rust
//! use cireg_model::{Descriptor, Type};
//! use cireg_registry::{ConnectionConfig, ConnectionManager, SessionRegistry, StaticBackend, TypeCatalog};
//! use std::sync::Arc;
//!
//! let backend = StaticBackend::from_descriptors(vec![Descriptor::new(Type::new("jee.War"))]);
//! let sessions = Arc::new(SessionRegistry::new());
//! let connection = ConnectionManager::new(ConnectionConfig::default(), Arc::new(backend), sessions);
//! let catalog = TypeCatalog::new(connection);
//!
//! assert_eq!(catalog.lookup_type("jee.War").unwrap(), Type::new("jee.War"));
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod descriptors;
pub mod error;
pub mod predicates;
pub mod queries;
pub mod session;

// Re-exports
pub use backend::{RegistryBackend, RemoteSession, StaticBackend};
pub use catalog::{DeployableView, TypeCatalog};
pub use config::{ConfigKey, ConnectionConfig};
pub use connection::{Acquisition, ConnectionManager, SessionGuard, SessionSlot};
pub use descriptors::{DescriptorRegistry, DescriptorSnapshot};
pub use error::{CatalogError, ConfigError, SchemaError, SessionError};
pub use queries::DeployableTypeQueries;
pub use session::{SessionHandle, SessionRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
