mod filesystem;
mod store;

pub use filesystem::JsonFileSessionStore;
pub use store::SessionStore;

use crate::models::ChatSession;

/// How many sessions are retained; the oldest beyond this are dropped.
pub const MAX_SESSIONS: usize = 10;

/// Upsert a session into a newest-first list: any entry with the same id
/// is replaced, the list stays sorted newest first, and at most
/// `MAX_SESSIONS` entries survive. Shared by the durable store and the
/// orchestrator's in-memory mirror so the two can't drift.
pub fn upsert_into(sessions: &mut Vec<ChatSession>, session: ChatSession) {
    sessions.retain(|s| s.id != session.id);
    sessions.insert(0, session);
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sessions.truncate(MAX_SESSIONS);
}
