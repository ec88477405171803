use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FileContext, Message, Role};

/// JSON request body for text-only turns. The backend is stateless, so the
/// full prior history rides along with every request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_context: Option<Vec<FileContext>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// An attachment as handed to the dispatcher: descriptor plus raw bytes.
/// The bytes live only for the duration of the send.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl Attachment {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One outbound request, already shaped for the wire.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    Json(ChatRequest),
    Multipart {
        message: String,
        file: Attachment,
        /// JSON-encoded snapshot of the current file context, if any.
        file_context: Option<String>,
    },
}

/// File-analysis block the backend may attach to a reply on file-bearing
/// turns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    #[serde(default)]
    pub document_content: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
}

impl FileAnalysis {
    /// Extracted text to remember for later turns, preferring document
    /// text over a raw sequence.
    pub fn extracted_text(&self) -> &str {
        self.document_content
            .as_deref()
            .or(self.sequence.as_deref())
            .unwrap_or("")
    }
}
