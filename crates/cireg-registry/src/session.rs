//! Process-wide session registry
//!
//! Holds at most one live session and one descriptor registry per
//! [`ConfigKey`]. Owned by the composition root and shared by `Arc`, so
//! tests build a fresh registry per run instead of touching global state.

use crate::backend::{RegistryBackend, RemoteSession};
use crate::config::{ConfigKey, ConnectionConfig};
use crate::descriptors::DescriptorRegistry;
use crate::error::SessionError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Handle to one live remote session
///
/// Cheap to clone; clones compare equal. Two handles compare equal only if
/// they came from the same bootstrap.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    id: Uuid,
    masked_key: String,
    session: Arc<dyn RemoteSession>,
}

impl SessionHandle {
    fn new(config: &ConnectionConfig, session: Arc<dyn RemoteSession>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                masked_key: config.masked_key(),
                session,
            }),
        }
    }

    /// Unique id of the underlying bootstrap
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Masked configuration key the session was bootstrapped for
    #[inline]
    #[must_use]
    pub fn masked_key(&self) -> &str {
        &self.inner.masked_key
    }

    /// Underlying remote session
    #[inline]
    #[must_use]
    pub fn remote(&self) -> &dyn RemoteSession {
        self.inner.session.as_ref()
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for SessionHandle {}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("key", &self.inner.masked_key)
            .finish_non_exhaustive()
    }
}

/// Concurrent keyed store of sessions and descriptor registries
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<ConfigKey, SessionHandle>,
    registries: DashMap<ConfigKey, Arc<DescriptorRegistry>>,
}

impl SessionRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session already bootstrapped for `config`
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotBootstrapped`] if none exists.
    pub fn reuse(&self, config: &ConnectionConfig) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(&config.key())
            .map(|handle| handle.value().clone())
            .ok_or_else(|| SessionError::NotBootstrapped {
                key: config.masked_key(),
            })
    }

    /// Bootstrap a session for `config` and register it with its descriptors
    ///
    /// If another caller registered a session for the same key meanwhile,
    /// that session wins and is returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backend cannot bootstrap or the
    /// initial descriptor load fails; nothing is registered in that case.
    pub fn bootstrap(
        &self,
        backend: &dyn RegistryBackend,
        config: &ConnectionConfig,
    ) -> Result<SessionHandle, SessionError> {
        let remote = backend.bootstrap(config)?;
        let registry = Arc::new(DescriptorRegistry::load(remote.as_ref())?);
        let handle = SessionHandle::new(config, remote);
        let key = config.key();

        match self.sessions.entry(key.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!(key = %config.masked_key(), "Session registered concurrently, closing ours");
                handle.remote().close();
                Ok(existing.get().clone())
            }
            Entry::Vacant(slot) => {
                self.registries.insert(key, registry);
                slot.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    /// Descriptor registry for `config`, if one is associated
    #[must_use]
    pub fn registry_for(&self, config: &ConnectionConfig) -> Option<Arc<DescriptorRegistry>> {
        self.registries
            .get(&config.key())
            .map(|registry| Arc::clone(registry.value()))
    }

    /// Descriptor registry for `config`, loading it through `session` if absent
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if loading fails.
    pub fn registry_or_load(
        &self,
        config: &ConnectionConfig,
        session: &SessionHandle,
    ) -> Result<Arc<DescriptorRegistry>, SessionError> {
        if let Some(registry) = self.registry_for(config) {
            return Ok(registry);
        }
        let loaded = Arc::new(DescriptorRegistry::load(session.remote())?);
        Ok(Arc::clone(
            self.registries.entry(config.key()).or_insert(loaded).value(),
        ))
    }

    /// Drop the descriptor registry associated with `config`
    ///
    /// Returns `true` if one was associated.
    pub fn discard_registry(&self, config: &ConnectionConfig) -> bool {
        self.registries.remove(&config.key()).is_some()
    }

    /// Tear down the session and registry for `config`
    ///
    /// Managers holding a cached handle keep using it until they reload.
    /// Returns `true` if a session was registered.
    pub fn shutdown(&self, config: &ConnectionConfig) -> bool {
        self.registries.remove(&config.key());
        let removed = self.sessions.remove(&config.key()).is_some();
        if removed {
            tracing::debug!(key = %config.masked_key(), "Session shut down");
        }
        removed
    }

    /// Number of registered sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no sessions are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
