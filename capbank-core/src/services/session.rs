//! Shared session context
//!
//! One `SessionContext` is created per client and cloned into the HTTP
//! gateway and every workflow. Writers are login, logout and the gateway's
//! 401 policy; everyone else only reads.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::adapters::memory::MemorySessionStore;
use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Context backed by an in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Current session, reading it from the store on first use
    pub fn current(&self) -> Option<Session> {
        if let Ok(guard) = self.current.read() {
            if let Some(session) = guard.as_ref() {
                return Some(session.clone()).filter(Session::has_token);
            }
        }

        let loaded = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                None
            }
        };

        if let Some(session) = &loaded {
            if let Ok(mut guard) = self.current.write() {
                *guard = Some(session.clone());
            }
        }

        loaded.filter(Session::has_token)
    }

    /// Bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user_id(&self) -> Option<String> {
        self.current().map(|s| s.user_id)
    }

    pub fn user_name(&self) -> Option<String> {
        self.current().and_then(|s| s.user_name)
    }

    /// True when a token is present. The token payload is not inspected.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a freshly issued session
    pub fn establish(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        let mut guard = self
            .current
            .write()
            .map_err(|e| Error::session(format!("Failed to lock session: {}", e)))?;
        debug!(user_id = %session.user_id, "session established");
        *guard = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in the store
    pub fn clear(&self) -> Result<()> {
        {
            let mut guard = self
                .current
                .write()
                .map_err(|e| Error::session(format!("Failed to lock session: {}", e)))?;
            *guard = None;
        }
        self.store.clear()?;
        debug!("session cleared");
        Ok(())
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
