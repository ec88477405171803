use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Identifier source for sessions and messages, injectable so tests can
/// supply deterministic ids.
pub trait IdGenerator: Send + Sync {
    fn session_id(&self) -> String;
    fn message_id(&self) -> String;
}

/// Production generator: millisecond time component plus a random suffix.
pub struct SystemIdGenerator;

impl SystemIdGenerator {
    pub fn new() -> Self {
        Self
    }

    fn suffix() -> String {
        let id = Uuid::new_v4().simple().to_string();
        id[..8].to_string()
    }
}

impl IdGenerator for SystemIdGenerator {
    fn session_id(&self) -> String {
        format!("session-{}-{}", chrono::Utc::now().timestamp_millis(), Self::suffix())
    }

    fn message_id(&self) -> String {
        format!("msg-{}-{}", chrono::Utc::now().timestamp_millis(), Self::suffix())
    }
}

impl Default for SystemIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic counter generator for tests.
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn session_id(&self) -> String {
        format!("session-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn message_id(&self) -> String {
        format!("msg-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}
