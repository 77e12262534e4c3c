//! In-memory session store

use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

/// Session store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a session already stored
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self
            .session
            .lock()
            .map_err(|e| Error::session(format!("Failed to lock session: {}", e)))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| Error::session(format!("Failed to lock session: {}", e)))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| Error::session(format!("Failed to lock session: {}", e)))?;
        *guard = None;
        Ok(())
    }
}
