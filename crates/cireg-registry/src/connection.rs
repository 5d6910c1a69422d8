//! Lazy, self-healing session acquisition
//!
//! A [`ConnectionManager`] caches one [`SessionHandle`] per instance. The
//! first acquisition tries to reuse a session bootstrapped elsewhere for the
//! same key; when none exists, it drops any stale descriptor registry for
//! the key and bootstraps a new session. Every step runs under the
//! manager's lock, exposed as a [`SessionGuard`] so callers can chain
//! further work (rebind, cache fill) into the same critical section.

use crate::backend::RegistryBackend;
use crate::config::ConnectionConfig;
use crate::error::SessionError;
use crate::session::{SessionHandle, SessionRegistry};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Per-manager session state
#[derive(Debug, Clone, Default)]
pub enum SessionSlot {
    /// No handle acquired yet
    #[default]
    Empty,
    /// Handle acquired and cached
    Cached(SessionHandle),
}

impl SessionSlot {
    /// Cached handle, if any
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<&SessionHandle> {
        match self {
            Self::Empty => None,
            Self::Cached(handle) => Some(handle),
        }
    }
}

/// How a session was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// Returned from this manager's slot
    Cached,
    /// Borrowed from a session bootstrapped by another manager
    Reused,
    /// Freshly bootstrapped after reuse found nothing
    Recreated,
}

/// Owns the session lifecycle for one connection configuration
#[derive(Debug)]
pub struct ConnectionManager {
    config: ConnectionConfig,
    masked_key: String,
    backend: Arc<dyn RegistryBackend>,
    sessions: Arc<SessionRegistry>,
    slot: Mutex<SessionSlot>,
}

impl ConnectionManager {
    /// Create manager; no session is acquired until first use
    #[must_use]
    pub fn new(
        config: ConnectionConfig,
        backend: Arc<dyn RegistryBackend>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        let masked_key = config.masked_key();
        Self {
            config,
            masked_key,
            backend,
            sessions,
            slot: Mutex::new(SessionSlot::Empty),
        }
    }

    /// Connection configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Masked configuration key for diagnostics
    #[inline]
    #[must_use]
    pub fn masked_key(&self) -> &str {
        &self.masked_key
    }

    /// Shared session registry
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Enter the manager's critical section
    pub fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            manager: self,
            slot: self.slot.lock(),
        }
    }

    /// Acquire the session for this manager's configuration
    ///
    /// Idempotent: later calls return the cached handle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if a fresh bootstrap fails; the failure is
    /// not retried.
    pub fn acquire_session(&self) -> Result<SessionHandle, SessionError> {
        self.lock().session()
    }

    /// Check if a handle is cached, without acquiring one
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.lock().slot().handle().is_some()
    }
}

/// Exclusive access to a manager's session slot
///
/// Dropping the guard releases the lock.
pub struct SessionGuard<'a> {
    manager: &'a ConnectionManager,
    slot: MutexGuard<'a, SessionSlot>,
}

impl SessionGuard<'_> {
    /// Current slot state
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &SessionSlot {
        &self.slot
    }

    /// Acquire a session, reporting which path produced it
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if reuse fails for a reason other than
    /// "not bootstrapped", or if the fallback bootstrap fails.
    pub fn acquire(&mut self) -> Result<(SessionHandle, Acquisition), SessionError> {
        if let Some(handle) = self.slot.handle() {
            return Ok((handle.clone(), Acquisition::Cached));
        }

        let manager = self.manager;
        let (handle, outcome) = match manager.sessions.reuse(&manager.config) {
            Ok(handle) => {
                tracing::debug!(key = %manager.masked_key, "Reusing existing session");
                (handle, Acquisition::Reused)
            }
            Err(cause) if cause.is_not_bootstrapped() => {
                tracing::warn!(
                    key = %manager.masked_key,
                    cause = %cause,
                    "No session found, creating new session"
                );
                manager.sessions.discard_registry(&manager.config);
                let handle = manager
                    .sessions
                    .bootstrap(manager.backend.as_ref(), &manager.config)?;
                (handle, Acquisition::Recreated)
            }
            Err(other) => return Err(other),
        };

        *self.slot = SessionSlot::Cached(handle.clone());
        Ok((handle, outcome))
    }

    /// Acquire a session
    ///
    /// # Errors
    ///
    /// See [`SessionGuard::acquire`].
    pub fn session(&mut self) -> Result<SessionHandle, SessionError> {
        self.acquire().map(|(handle, _)| handle)
    }

    /// Owning manager
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &ConnectionManager {
        self.manager
    }
}
