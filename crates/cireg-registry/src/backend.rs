//! Remote registry collaborator seam
//!
//! [`RegistryBackend`] establishes sessions; [`RemoteSession`] serves the
//! descriptor set. A network client implements these traits out of tree;
//! [`StaticBackend`] serves a fixed descriptor set from memory or from a
//! JSON/YAML dump.

use crate::config::ConnectionConfig;
use crate::error::{ConfigError, SessionError};
use cireg_model::Descriptor;
use parking_lot::RwLock;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Establishes remote sessions
pub trait RegistryBackend: Send + Sync + fmt::Debug {
    /// Bootstrap a fresh session for `config`
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the remote side cannot be reached or
    /// rejects the credentials.
    fn bootstrap(&self, config: &ConnectionConfig) -> Result<Arc<dyn RemoteSession>, SessionError>;
}

/// Live session against a remote registry
pub trait RemoteSession: Send + Sync + fmt::Debug {
    /// Fetch the full descriptor set currently served by the remote side
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`] when the call fails.
    fn fetch_descriptors(&self) -> Result<Vec<Descriptor>, SessionError>;

    /// Release server-side state held for this session
    ///
    /// Called when a freshly bootstrapped session loses registration to a
    /// concurrent one. The default does nothing.
    fn close(&self) {}
}

/// In-memory backend over a fixed descriptor set
///
/// Sessions share the backend's content, so [`StaticBackend::replace`]
/// becomes visible to every session on its next fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    descriptors: Arc<RwLock<Vec<Descriptor>>>,
}

impl StaticBackend {
    /// Create backend serving `descriptors`
    #[must_use]
    pub fn from_descriptors(descriptors: Vec<Descriptor>) -> Self {
        Self {
            descriptors: Arc::new(RwLock::new(descriptors)),
        }
    }

    /// Parse a JSON descriptor dump (an array of descriptors)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_descriptors(serde_json::from_str(text)?))
    }

    /// Parse a YAML descriptor dump (a sequence of descriptors)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed input.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_descriptors(serde_yaml::from_str(text)?))
    }

    /// Load a descriptor dump, choosing the format by file extension
    /// (`.json`, `.yaml` or `.yml`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, has an unknown
    /// extension, or cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        parse(&text)
    }

    /// Swap the served descriptor set
    pub fn replace(&self, descriptors: Vec<Descriptor>) {
        *self.descriptors.write() = descriptors;
    }

    /// Number of served descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Check if no descriptors are served
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}

impl RegistryBackend for StaticBackend {
    fn bootstrap(&self, _config: &ConnectionConfig) -> Result<Arc<dyn RemoteSession>, SessionError> {
        Ok(Arc::new(StaticSession {
            descriptors: Arc::clone(&self.descriptors),
        }))
    }
}

#[derive(Debug)]
struct StaticSession {
    descriptors: Arc<RwLock<Vec<Descriptor>>>,
}

impl RemoteSession for StaticSession {
    fn fetch_descriptors(&self) -> Result<Vec<Descriptor>, SessionError> {
        Ok(self.descriptors.read().clone())
    }
}
