pub mod client;
pub mod models;
pub mod response;

pub use client::{ChatTransport, HttpChatTransport};
pub use models::{Attachment, ChatRequest, FileAnalysis, HistoryEntry, OutboundPayload};
pub use response::{resolve_reply, ReplySource, ResolvedReply, REPLY_FALLBACK};
