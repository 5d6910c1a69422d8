//! Configuration-item type identity
//!
//! Provides [`Type`], the opaque name of a configuration-item class, and
//! [`CiClass`], the compile-time binding of a Rust type to such a name.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opaque, globally unique identifier of a configuration-item class
///
/// Types are compared and hashed by name. Cloning is cheap (shared `Arc<str>`).
/// Subtype relations are not known to a bare `Type`; they live on the
/// owning [`Descriptor`](crate::Descriptor).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Type(Arc<str>);

impl Type {
    /// Create type from its fully qualified name (e.g. `jee.War`)
    #[inline]
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Fully qualified name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0)
    }
}

impl From<&str> for Type {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Type {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

// Lets name-keyed maps be queried with a plain `&str`.
impl Borrow<str> for Type {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Binds a Rust type to a registry type name
///
/// This is the "lookup by class" form of type resolution: callers that model
/// a configuration-item class in Rust implement it once and resolve or build
/// items without spelling the name at each call site.
///
/// # Example
/// ```rust
/// use cireg_model::CiClass;
///
/// pub struct War;
///
/// impl CiClass for War {
///     const TYPE_NAME: &'static str = "jee.War";
/// }
///
/// assert_eq!(War::TYPE_NAME, "jee.War");
/// ```
pub trait CiClass {
    /// Fully qualified registry type name
    const TYPE_NAME: &'static str;
}
