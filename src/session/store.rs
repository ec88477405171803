use crate::error::Result;
use crate::models::ChatSession;

/// Trait for session storage backends. This is the only component allowed
/// to touch durable storage.
pub trait SessionStore: Send + Sync {
    /// All persisted sessions, newest first. Corrupt or missing data reads
    /// as the empty list.
    fn load_all(&self) -> Vec<ChatSession>;

    /// Look up one session by id.
    fn find(&self, id: &str) -> Option<ChatSession>;

    /// Replace any session with the same id and prepend this one, keeping
    /// at most the newest `MAX_SESSIONS`.
    fn upsert(&self, session: &ChatSession) -> Result<()>;

    /// Delete all persisted sessions.
    fn clear_all(&self) -> Result<()>;
}
