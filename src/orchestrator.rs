use std::sync::Arc;

use chrono::Utc;

use crate::api::models::{Attachment, HistoryEntry};
use crate::api::{ChatTransport, HttpChatTransport};
use crate::config::ChatConfig;
use crate::dispatcher::{DispatchOutcome, MessageDispatcher, TurnRequest};
use crate::error::Result;
use crate::identity::{IdentityProvider, StaticIdentityProvider};
use crate::ids::{IdGenerator, SystemIdGenerator};
use crate::models::{AttachedFile, ChatSession, FileContextTracker, Message, Role};
use crate::session::{upsert_into, JsonFileSessionStore, SessionStore};
use crate::title::generate_title;

/// Single source of truth for the active conversation.
///
/// Owns the in-memory message list and file context of the active session
/// and coordinates the dispatcher, the title generator, and the session
/// store. Sends are serialized by the in-flight guard; a send runs to
/// completion or failure and cannot be aborted.
pub struct ChatOrchestrator {
    messages: Vec<Message>,
    sessions: Vec<ChatSession>,
    file_context: FileContextTracker,
    current_session_id: Option<String>,
    current_title: Option<String>,
    is_loading: bool,
    dispatcher: MessageDispatcher,
    store: Box<dyn SessionStore>,
    ids: Arc<dyn IdGenerator>,
}

impl ChatOrchestrator {
    /// Orchestrator wired to the real HTTP transport and the JSON file
    /// store named by `config`, with no signed-in identity.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let transport =
            HttpChatTransport::new(config.endpoint.clone(), config.request_timeout_secs)?;
        Ok(Self::with_parts(
            Box::new(JsonFileSessionStore::new(config.sessions_path.clone())),
            Arc::new(transport),
            Arc::new(StaticIdentityProvider::anonymous()),
            Arc::new(SystemIdGenerator::new()),
        ))
    }

    /// Orchestrator from explicit collaborators. Tests use this to inject
    /// a scripted transport and deterministic ids.
    pub fn with_parts(
        store: Box<dyn SessionStore>,
        transport: Arc<dyn ChatTransport>,
        identity: Arc<dyn IdentityProvider>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let sessions = store.load_all();
        Self {
            messages: Vec::new(),
            sessions,
            file_context: FileContextTracker::new(),
            current_session_id: None,
            current_title: None,
            is_loading: false,
            dispatcher: MessageDispatcher::new(transport, identity, Arc::clone(&ids)),
            store,
            ids,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Persisted sessions mirrored in memory, newest first.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn file_context(&self) -> &FileContextTracker {
        &self.file_context
    }

    /// Send one user turn. Returns `false` if the call was ignored: a
    /// previous send is still in flight, or there is nothing to send.
    ///
    /// The user message is appended before the network call and is never
    /// rolled back; whatever happens, exactly one assistant message (the
    /// reply, or a fixed apology) follows it. The session is persisted
    /// only after a successful turn.
    pub async fn send_message(&mut self, content: &str, attachments: Vec<Attachment>) -> bool {
        if self.is_loading {
            log::warn!("send ignored: a previous send has not resolved");
            return false;
        }
        if content.trim().is_empty() && attachments.is_empty() {
            return false;
        }

        self.is_loading = true;

        let session_id = self
            .current_session_id
            .clone()
            .unwrap_or_else(|| self.ids.session_id());

        let history: Vec<HistoryEntry> = self.messages.iter().map(HistoryEntry::from).collect();

        let mut user_message = Message::user(self.ids.message_id(), content);
        user_message.attached_files = attachments
            .iter()
            .map(|a| AttachedFile {
                name: a.name.clone(),
                size: a.size(),
                mime_type: a.mime_type.clone(),
            })
            .collect();
        self.messages.push(user_message);

        let turn = TurnRequest {
            content: content.to_string(),
            attachments,
            conversation_id: session_id.clone(),
            history,
            file_context: self.file_context.snapshot(),
        };

        let outcome = self.dispatcher.dispatch(turn).await;
        match outcome {
            DispatchOutcome::Reply {
                message,
                new_context,
            } => {
                self.messages.push(message);
                if let Some(context) = new_context {
                    self.file_context.push(context);
                }
                self.current_session_id = Some(session_id);
                self.persist_active_session();
            }
            DispatchOutcome::Failed { message } => {
                self.messages.push(message);
            }
        }

        self.is_loading = false;
        true
    }

    /// Start a fresh conversation. Persisted sessions are untouched.
    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.file_context.clear();
        self.current_session_id = None;
        self.current_title = None;
    }

    /// Make `session` the active conversation and move it to the front of
    /// the in-memory list without duplicating it.
    pub fn switch_to_session(&mut self, session: &ChatSession) {
        self.messages = session.messages.clone();
        self.file_context
            .restore(session.file_context.clone().unwrap_or_default());
        self.current_session_id = Some(session.id.clone());
        self.current_title = Some(session.title.clone());

        if let Some(pos) = self.sessions.iter().position(|s| s.id == session.id) {
            let existing = self.sessions.remove(pos);
            self.sessions.insert(0, existing);
        } else {
            self.sessions.insert(0, session.clone());
        }
    }

    /// Load a persisted session by id. An unknown id resets to an empty
    /// conversation; it is not an error.
    pub fn load_session(&mut self, session_id: &str) {
        match self.store.find(session_id) {
            Some(session) => {
                self.messages = session.messages.clone();
                self.file_context
                    .restore(session.file_context.clone().unwrap_or_default());
                self.current_session_id = Some(session.id.clone());
                self.current_title = Some(session.title.clone());
            }
            None => {
                log::debug!("session {} not found; starting empty", session_id);
                self.new_chat();
            }
        }
    }

    /// Wipe all persisted sessions and reset the active conversation.
    pub fn clear_history(&mut self) {
        if let Err(e) = self.store.clear_all() {
            log::error!("failed to clear session store: {}", e);
        }
        self.sessions.clear();
        self.new_chat();
    }

    fn persist_active_session(&mut self) {
        let id = match self.current_session_id.clone() {
            Some(id) => id,
            None => return,
        };

        let title = match &self.current_title {
            Some(title) => title.clone(),
            None => {
                let title = self
                    .messages
                    .iter()
                    .find(|m| m.role == Role::User)
                    .map(|m| generate_title(&m.content))
                    .unwrap_or_else(|| "New Conversation".to_string());
                self.current_title = Some(title.clone());
                title
            }
        };

        let session = ChatSession {
            id,
            title,
            timestamp: Utc::now(),
            messages: self.messages.clone(),
            file_context: if self.file_context.is_empty() {
                None
            } else {
                Some(self.file_context.snapshot())
            },
        };

        if let Err(e) = self.store.upsert(&session) {
            log::error!("failed to persist session {}: {}", session.id, e);
        }
        upsert_into(&mut self.sessions, session);
    }
}
