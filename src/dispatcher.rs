use std::sync::Arc;

use crate::api::models::{Attachment, ChatRequest, HistoryEntry, OutboundPayload};
use crate::api::response::{extract_file_analysis, extract_metadata, resolve_reply, ReplySource};
use crate::api::ChatTransport;
use crate::error::Result;
use crate::identity::{IdentityProvider, UserIdentity};
use crate::ids::IdGenerator;
use crate::models::{FileContext, Message};

/// Reply substituted when the send fails outright (network, status, or
/// parse failure).
pub const SEND_FAILURE_REPLY: &str =
    "I'm sorry, something went wrong while processing your message. Please try again.";

/// Visible notice for a turn carrying more than one attachment.
pub const MULTI_FILE_NOTICE: &str =
    "I can only analyze one file per message. Please attach a single file and try again.";

/// Everything the dispatcher needs to run one outbound turn.
pub struct TurnRequest {
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub conversation_id: String,
    /// Prior history, excluding the message being sent.
    pub history: Vec<HistoryEntry>,
    pub file_context: Vec<FileContext>,
}

/// Result of one dispatched turn. Both arms carry the assistant message
/// that pairs the user's turn; only `Reply` marks a successful turn.
pub enum DispatchOutcome {
    Reply {
        message: Message,
        new_context: Option<FileContext>,
    },
    Failed {
        message: Message,
    },
}

/// Builds the outbound request, performs the network call, and turns the
/// response into a validated assistant message. Never returns an error to
/// the caller; every failure collapses into a `Failed` outcome.
pub struct MessageDispatcher {
    transport: Arc<dyn ChatTransport>,
    identity: Arc<dyn IdentityProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl MessageDispatcher {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        identity: Arc<dyn IdentityProvider>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            transport,
            identity,
            ids,
        }
    }

    pub async fn dispatch(&self, turn: TurnRequest) -> DispatchOutcome {
        if turn.attachments.len() > 1 {
            log::warn!(
                "rejecting send with {} attachments; one file per message",
                turn.attachments.len()
            );
            return DispatchOutcome::Failed {
                message: Message::assistant(self.ids.message_id(), MULTI_FILE_NOTICE),
            };
        }

        match self.try_dispatch(turn).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("send failed: {}", e);
                DispatchOutcome::Failed {
                    message: Message::assistant(self.ids.message_id(), SEND_FAILURE_REPLY),
                }
            }
        }
    }

    async fn try_dispatch(&self, turn: TurnRequest) -> Result<DispatchOutcome> {
        let identity = self
            .identity
            .current_identity()
            .unwrap_or_else(UserIdentity::demo);

        let attachment = turn.attachments.into_iter().next();
        let payload = match &attachment {
            Some(file) => {
                let file_context = if turn.file_context.is_empty() {
                    None
                } else {
                    Some(serde_json::to_string(&turn.file_context)?)
                };
                OutboundPayload::Multipart {
                    message: turn.content,
                    file: file.clone(),
                    file_context,
                }
            }
            None => OutboundPayload::Json(ChatRequest {
                message: turn.content,
                conversation_id: turn.conversation_id,
                conversation_history: turn.history,
                file_context: if turn.file_context.is_empty() {
                    None
                } else {
                    Some(turn.file_context)
                },
            }),
        };

        let body = self.transport.send(&identity, payload).await?;

        let reply = resolve_reply(&body);
        if reply.source == ReplySource::Fallback {
            log::warn!("response body had no usable reply field");
        }

        let mut message = Message::assistant(self.ids.message_id(), reply.text);
        message.metadata = extract_metadata(&body);

        let new_context = match (&attachment, extract_file_analysis(&body)) {
            (Some(file), Some(analysis)) => Some(FileContext::new(
                file.name.clone(),
                file.mime_type.clone(),
                file.size(),
                analysis.extracted_text(),
            )),
            _ => None,
        };

        Ok(DispatchOutcome::Reply {
            message,
            new_context,
        })
    }
}
