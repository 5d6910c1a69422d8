//! CIREG Core
//!
//! Materializes configuration items from raw strings using descriptors
//! served by a remote registry.
//!
//! # Components
//!
//! - [`PropertyCoercer`]: kind-driven conversion of raw strings into [`PropertyValue`](cireg_model::PropertyValue)s
//! - [`ConfigurationItemBuilder`]: instantiation with containment defaults, and embedding
//! - [`DescriptorRegistryClient`]: one-stop facade over catalog, builder and queries
//!
//! # Example
//!
//! ```rust
//! use cireg_core::DescriptorRegistryClient;
//! use cireg_model::{Descriptor, PropertyDescriptor, PropertyKind, PropertyValue, Type};
//! use cireg_registry::{ConnectionConfig, SessionRegistry, StaticBackend};
//! use std::sync::Arc;
//!
//! let backend = StaticBackend::from_descriptors(vec![
//!     Descriptor::new(Type::new("jee.War"))
//!         .with_property(PropertyDescriptor::new("contextRoot", PropertyKind::String)),
//! ]);
//! let client = DescriptorRegistryClient::new(
//!     ConnectionConfig::default(),
//!     Arc::new(backend),
//!     Arc::new(SessionRegistry::new()),
//! );
//!
//! let mut war = client.new_instance("jee.War", "Applications/petclinic").unwrap();
//! client.set_property_value(&mut war, "contextRoot", Some("/petclinic")).unwrap();
//! assert_eq!(war.property("contextRoot"), Some(&PropertyValue::String("/petclinic".into())));
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod client;
pub mod coerce;
pub mod error;

// Re-exports
pub use builder::{initialize_containment, ConfigurationItemBuilder};
pub use client::DescriptorRegistryClient;
pub use coerce::{split_values, PropertyCoercer};
pub use error::{BuildError, CoercionError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{BuildError, CoercionError, ConfigurationItemBuilder, DescriptorRegistryClient, PropertyCoercer};
    pub use cireg_model::{CiClass, ConfigurationItem, Descriptor, PropertyDescriptor, PropertyKind, PropertyValue, Type};
    pub use cireg_registry::{CatalogError, ConnectionConfig, SessionRegistry};
}
