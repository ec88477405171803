use serde_json::Value;

use crate::api::models::FileAnalysis;
use crate::models::ResponseMetadata;

/// Reply text used when the backend omits both reply fields.
pub const REPLY_FALLBACK: &str =
    "I'm sorry, I couldn't generate a response. Please try again.";

/// Which field of the response body supplied the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Content,
    Response,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ResolvedReply {
    pub text: String,
    pub source: ReplySource,
}

/// Resolve the reply text from a parsed response body.
///
/// Resolution order is fixed: `content`, then `response`, then the
/// fallback string. Non-string values count as absent, so the result is
/// always a string.
pub fn resolve_reply(body: &Value) -> ResolvedReply {
    if let Some(text) = body.get("content").and_then(|v| v.as_str()) {
        return ResolvedReply {
            text: text.to_string(),
            source: ReplySource::Content,
        };
    }
    if let Some(text) = body.get("response").and_then(|v| v.as_str()) {
        return ResolvedReply {
            text: text.to_string(),
            source: ReplySource::Response,
        };
    }
    ResolvedReply {
        text: REPLY_FALLBACK.to_string(),
        source: ReplySource::Fallback,
    }
}

/// Token usage and conversation-limit status, when the backend reports
/// them. A malformed block reads as absent.
pub fn extract_metadata(body: &Value) -> Option<ResponseMetadata> {
    let metadata = body.get("metadata")?;
    serde_json::from_value(metadata.clone()).ok()
}

/// File-analysis block from a file-bearing turn, if present.
pub fn extract_file_analysis(body: &Value) -> Option<FileAnalysis> {
    let analysis = body.get("fileAnalysis")?;
    serde_json::from_value(analysis.clone()).ok()
}
