//! CIREG Model
//!
//! Pure data model for descriptor-driven configuration items.
//!
//! # Overview
//!
//! - [`Type`]: opaque configuration-item class identity
//! - [`PropertyKind`]: closed set of property value shapes
//! - [`PropertyDescriptor`]: one property of a type (kind, flags, referenced type)
//! - [`Descriptor`]: full metadata for one type, including assignability
//! - [`ConfigurationItem`]: identified item holding [`PropertyValue`]s
//!
//! # Example
//!
//! ```rust
//! use cireg_model::{ConfigurationItem, Descriptor, PropertyDescriptor, PropertyKind, Type};
//!
//! let descriptor = Descriptor::new(Type::new("jee.War"))
//!     .with_supertypes([Type::new("udm.Artifact")])
//!     .with_property(PropertyDescriptor::new("contextRoot", PropertyKind::String));
//!
//! assert!(descriptor.is_assignable_to(&Type::new("udm.Artifact")));
//!
//! let item = ConfigurationItem::new(descriptor.ty().clone(), "Applications/petclinic");
//! assert!(item.property("contextRoot").is_none());
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod item;
pub mod property;
pub mod types;

// Re-exports
pub use descriptor::Descriptor;
pub use item::{ConfigurationItem, PropertyValue};
pub use property::{PropertyDescriptor, PropertyKind};
pub use types::{CiClass, Type};

/// Well-known base type names of the deployment model
pub mod udm {
    /// Base of every deployable item (artifacts and resources)
    pub const DEPLOYABLE: &str = "udm.Deployable";
    /// Base of deployables embedded in a parent deployable
    pub const EMBEDDED_DEPLOYABLE: &str = "udm.EmbeddedDeployable";
    /// Base of file-backed deployables
    pub const ARTIFACT: &str = "udm.Artifact";
    /// Property name excluded from editable listings
    pub const TAGS_PROPERTY: &str = "tags";
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
