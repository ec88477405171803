use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file_context::FileContext;
use super::message::Message;

/// A persisted conversation. The whole object is replaced on every
/// successful turn; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_context: Option<Vec<FileContext>>,
}
