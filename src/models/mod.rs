mod file_context;
mod message;
mod session;

pub use file_context::{
    FileContext, FileContextTracker, MAX_CONTEXT_CONTENT_CHARS, MAX_FILE_CONTEXTS,
    MAX_SUMMARY_CHARS,
};
pub use message::{
    AttachedFile, ConversationLimit, Message, ResponseMetadata, Role, TokenUsage,
};
pub use session::ChatSession;
