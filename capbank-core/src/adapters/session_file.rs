//! File-backed session store
//!
//! Persists the session as `session.json` in the client data directory,
//! using the same keys the browser client kept in its cookies.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store inside `dir` (the file name is fixed)
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        // A corrupt file is treated as "logged out" rather than a hard failure
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) if session.has_token() => Ok(Some(session)),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!(error = %e, path = %self.path.display(), "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, contents).map_err(|e| {
            Error::session(format!(
                "Failed to write session to {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
