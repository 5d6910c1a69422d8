//! Error types for CIREG Core
//!
//! Provides error handling for:
//! - Raw string coercion failures
//! - Item instantiation failures
//! - Embedding schema mismatches

use cireg_model::Type;
use cireg_registry::CatalogError;
use std::num::ParseIntError;

/// Raw string could not be coerced into a property's kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// Non-numeric input for an integer property
    #[error("invalid integer '{raw}' for property '{property}': {source}")]
    InvalidInteger {
        property: String,
        raw: String,
        #[source]
        source: ParseIntError,
    },

    /// Map entry that is not exactly one `key=value` pair
    #[error("malformed map entry '{entry}' for property '{property}': expected key=value")]
    MalformedMapEntry { property: String, entry: String },

    /// Map key given more than once
    #[error("duplicate map key '{key}' for property '{property}'")]
    DuplicateMapKey { property: String, key: String },

    /// CI-kinded property without referenced type
    #[error("property '{property}' references CIs but declares no referenced type")]
    MissingReferencedType { property: String },
}

/// Item building and embedding errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Instantiation or collection initialization failed
    #[error("unable to instantiate CI '{ty}' with id '{id}': {source}")]
    Instantiation {
        ty: Type,
        id: String,
        #[source]
        source: Box<CatalogError>,
    },

    /// No containment property of the parent holds the child's exact type
    #[error("failed to find property that embeds {child} into parent {parent}")]
    NoEmbeddingProperty { parent: String, child: String },

    /// Embedding property holds a value that is not a CI collection
    #[error("property '{property}' of {parent} does not hold a CI collection")]
    IncompatibleCollection { parent: String, property: String },

    /// Item's type declares no such property
    #[error("type {ty} has no property '{property}'")]
    UnknownProperty { ty: Type, property: String },

    /// Lookup failed before building started
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Raw value could not be coerced
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl BuildError {
    pub(crate) fn instantiation(ty: &Type, id: &str, source: CatalogError) -> Self {
        Self::Instantiation {
            ty: ty.clone(),
            id: id.to_string(),
            source: Box::new(source),
        }
    }

    /// Check if error is a "not found" condition surfaced from the catalog
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Catalog(err) => err.is_not_found(),
            Self::Instantiation { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
