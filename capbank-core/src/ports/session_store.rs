//! Session persistence port

use crate::domain::result::Result;
use crate::domain::Session;

/// Where the session survives between runs (a file for the CLI, memory in tests)
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    /// Forget everything. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
