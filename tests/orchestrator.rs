use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use tempfile::TempDir;

use biochat::api::models::{Attachment, OutboundPayload};
use biochat::api::ChatTransport;
use biochat::dispatcher::{MULTI_FILE_NOTICE, SEND_FAILURE_REPLY};
use biochat::error::{BiochatError, Result};
use biochat::identity::{StaticIdentityProvider, UserIdentity};
use biochat::ids::SequentialIdGenerator;
use biochat::models::{ConversationLimit, Role};
use biochat::session::{JsonFileSessionStore, SessionStore};
use biochat::ChatOrchestrator;

/// Transport that replays a scripted list of responses and records every
/// request it sees.
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(UserIdentity, OutboundPayload)>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<Value>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call(&self, index: usize) -> (UserIdentity, OutboundPayload) {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, identity: &UserIdentity, payload: OutboundPayload) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((identity.clone(), payload));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "content": "ok" })))
    }
}

fn reply(text: &str) -> Result<Value> {
    Ok(json!({ "content": text }))
}

fn orchestrator(dir: &TempDir, transport: Arc<ScriptedTransport>) -> ChatOrchestrator {
    ChatOrchestrator::with_parts(
        Box::new(JsonFileSessionStore::new(dir.path().join("sessions.json"))),
        transport,
        Arc::new(StaticIdentityProvider::anonymous()),
        Arc::new(SequentialIdGenerator::new()),
    )
}

fn attachment(name: &str) -> Attachment {
    Attachment {
        name: name.to_string(),
        mime_type: "text/plain".to_string(),
        bytes: Bytes::from_static(b">seq1\nACGTACGT\n"),
    }
}

#[tokio::test]
async fn test_turns_alternate_in_submission_order() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("one"), reply("two"), reply("three")]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    for prompt in ["first", "second", "third"] {
        assert!(chat.send_message(prompt, vec![]).await);
    }

    let messages = chat.messages();
    assert_eq!(messages.len(), 6);
    for pair in messages.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
    assert_eq!(messages[1].content, "one");
    assert_eq!(messages[3].content, "two");
    assert_eq!(messages[5].content, "three");
}

#[tokio::test]
async fn test_failed_send_keeps_user_message_and_pairs_apology() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![Err(BiochatError::ApiError {
        status: 500,
        message: "backend exploded".to_string(),
    })]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    assert!(chat.send_message("does this work?", vec![]).await);

    // No orphan turn: user message stays, apology pairs it.
    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "does this work?");
    assert_eq!(messages[1].content, SEND_FAILURE_REPLY);
    assert!(!chat.is_loading());

    // A failed turn is never persisted.
    assert!(chat.sessions().is_empty());
    let store = JsonFileSessionStore::new(dir.path().join("sessions.json"));
    assert!(store.load_all().is_empty());
}

#[tokio::test]
async fn test_parse_failure_resolves_like_transport_failure() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![Err(BiochatError::JsonError(
        serde_json::from_str::<Value>("not json").unwrap_err(),
    ))]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("hello", vec![]).await;
    assert_eq!(chat.messages()[1].content, SEND_FAILURE_REPLY);
}

#[tokio::test]
async fn test_first_success_materializes_session() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("re: one"), reply("re: two")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("Explain CRISPR off-target effects", vec![])
        .await;

    assert_eq!(chat.sessions().len(), 1);
    let session = &chat.sessions()[0];
    assert_eq!(session.title, "CRISPR Analysis");
    assert_eq!(session.messages.len(), 2);

    // Second turn upserts the same session rather than adding one.
    let id = session.id.clone();
    chat.send_message("And how do I avoid them?", vec![]).await;
    assert_eq!(chat.sessions().len(), 1);
    assert_eq!(chat.sessions()[0].id, id);
    assert_eq!(chat.sessions()[0].messages.len(), 4);

    let store = JsonFileSessionStore::new(dir.path().join("sessions.json"));
    let persisted = store.load_all();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].messages.len(), 4);
}

#[tokio::test]
async fn test_json_payload_carries_history_and_stable_conversation_id() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("a"), reply("b")]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    chat.send_message("first", vec![]).await;
    chat.send_message("second", vec![]).await;

    let (_, first_payload) = transport.call(0);
    let (_, second_payload) = transport.call(1);

    let OutboundPayload::Json(first) = first_payload else {
        panic!("expected JSON payload");
    };
    let OutboundPayload::Json(second) = second_payload else {
        panic!("expected JSON payload");
    };

    assert_eq!(first.message, "first");
    assert!(first.conversation_history.is_empty());
    // Prior history only: the in-flight message rides in `message`.
    assert_eq!(second.conversation_history.len(), 2);
    assert_eq!(second.conversation_history[0].content, "first");
    assert_eq!(first.conversation_id, second.conversation_id);
}

#[tokio::test]
async fn test_demo_identity_substituted_when_absent() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("hi")]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    chat.send_message("hello", vec![]).await;

    let (identity, _) = transport.call(0);
    assert_eq!(identity, UserIdentity::demo());
}

#[tokio::test]
async fn test_signed_in_identity_is_used() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("hi")]);
    let user = UserIdentity {
        uid: "uid-42".to_string(),
        email: "researcher@lab.example".to_string(),
        display_name: "Researcher".to_string(),
        photo_url: None,
    };
    let mut chat = ChatOrchestrator::with_parts(
        Box::new(JsonFileSessionStore::new(dir.path().join("sessions.json"))),
        Arc::clone(&transport) as Arc<dyn ChatTransport>,
        Arc::new(StaticIdentityProvider::new(Some(user.clone()))),
        Arc::new(SequentialIdGenerator::new()),
    );

    chat.send_message("hello", vec![]).await;

    let (identity, _) = transport.call(0);
    assert_eq!(identity, user);
}

#[tokio::test]
async fn test_multi_file_send_rejected_before_network() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    chat.send_message(
        "analyze both",
        vec![attachment("a.fasta"), attachment("b.fasta")],
    )
    .await;

    assert_eq!(transport.call_count(), 0);
    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, MULTI_FILE_NOTICE);
    assert!(chat.sessions().is_empty());
}

#[tokio::test]
async fn test_file_send_uses_multipart_and_derives_context() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "response": "Looks like a FASTA file",
        "fileAnalysis": { "sequence": "ACGTACGT" }
    }))]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    chat.send_message("what is this?", vec![attachment("reads.fasta")])
        .await;

    let (_, payload) = transport.call(0);
    let OutboundPayload::Multipart { file, .. } = payload else {
        panic!("expected multipart payload");
    };
    assert_eq!(file.name, "reads.fasta");

    // Descriptor kept on the user message, bytes not part of state.
    assert_eq!(chat.messages()[0].attached_files.len(), 1);
    assert_eq!(chat.messages()[0].attached_files[0].name, "reads.fasta");

    let contexts = chat.file_context().entries();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].content, "ACGTACGT");

    // The context snapshot rides with the persisted session.
    let store = JsonFileSessionStore::new(dir.path().join("sessions.json"));
    let persisted = store.load_all();
    assert_eq!(persisted[0].file_context.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_context_evicts_oldest_after_five_files() {
    let dir = TempDir::new().unwrap();
    let responses = (0..5)
        .map(|i| {
            Ok(json!({
                "response": "analyzed",
                "fileAnalysis": { "documentContent": format!("text {}", i) }
            }))
        })
        .collect();
    let transport = ScriptedTransport::new(responses);
    let mut chat = orchestrator(&dir, transport);

    for i in 0..5 {
        chat.send_message("analyze", vec![attachment(&format!("file{}.txt", i))])
            .await;
    }

    let names: Vec<&str> = chat
        .file_context()
        .entries()
        .iter()
        .map(|c| c.filename.as_str())
        .collect();
    assert_eq!(names, vec!["file2.txt", "file3.txt", "file4.txt"]);
}

#[tokio::test]
async fn test_metadata_attached_to_assistant_message() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "content": "long answer",
        "metadata": {
            "tokenUsage": { "promptTokens": 900, "completionTokens": 100, "totalTokens": 1000 },
            "conversationLimit": "critical"
        }
    }))]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("keep going", vec![]).await;

    let metadata = chat.messages()[1].metadata.as_ref().unwrap();
    assert_eq!(metadata.conversation_limit, Some(ConversationLimit::Critical));
    assert_eq!(metadata.token_usage.as_ref().unwrap().total_tokens, 1000);
}

#[tokio::test]
async fn test_new_chat_clears_active_state_only() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("hi")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("hello", vec![]).await;
    chat.new_chat();

    assert!(chat.messages().is_empty());
    assert!(chat.current_session_id().is_none());
    assert!(chat.file_context().is_empty());
    assert_eq!(chat.sessions().len(), 1);
}

#[tokio::test]
async fn test_switch_to_session_restores_and_promotes() {
    let dir = TempDir::new().unwrap();
    let transport =
        ScriptedTransport::new(vec![reply("a"), reply("b"), reply("c")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("Explain BLAST scoring", vec![]).await;
    let first = chat.sessions()[0].clone();

    chat.new_chat();
    chat.send_message("Debug my python parser", vec![]).await;
    assert_eq!(chat.sessions().len(), 2);
    assert_eq!(chat.sessions()[0].title, "Python Help");

    chat.switch_to_session(&first);
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.current_session_id(), Some(first.id.as_str()));

    // MRU promotion, no duplicate.
    assert_eq!(chat.sessions().len(), 2);
    assert_eq!(chat.sessions()[0].id, first.id);

    // Continuing the restored session appends to it.
    chat.send_message("And the E-value?", vec![]).await;
    assert_eq!(chat.sessions().len(), 2);
    assert_eq!(chat.sessions()[0].messages.len(), 4);
}

#[tokio::test]
async fn test_load_session_unknown_id_resets_quietly() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("hi")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("hello", vec![]).await;
    chat.load_session("no-such-session");

    assert!(chat.messages().is_empty());
    assert!(chat.current_session_id().is_none());
}

#[tokio::test]
async fn test_load_session_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("hi")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("hello", vec![]).await;
    let id = chat.current_session_id().unwrap().to_string();

    chat.load_session(&id);
    let first_load = chat.messages().to_vec();
    chat.load_session(&id);
    assert_eq!(chat.messages(), first_load.as_slice());
}

#[tokio::test]
async fn test_empty_send_is_ignored() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![]);
    let mut chat = orchestrator(&dir, Arc::clone(&transport));

    assert!(!chat.send_message("   ", vec![]).await);
    assert!(chat.messages().is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_clear_history_wipes_store_and_state() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![reply("a"), reply("b")]);
    let mut chat = orchestrator(&dir, transport);

    chat.send_message("one", vec![]).await;
    chat.new_chat();
    chat.send_message("two", vec![]).await;

    chat.clear_history();
    assert!(chat.sessions().is_empty());
    assert!(chat.messages().is_empty());

    let store = JsonFileSessionStore::new(dir.path().join("sessions.json"));
    assert!(store.load_all().is_empty());
}

#[tokio::test]
async fn test_sessions_reload_on_construction() {
    let dir = TempDir::new().unwrap();
    {
        let transport = ScriptedTransport::new(vec![reply("hi")]);
        let mut chat = orchestrator(&dir, transport);
        chat.send_message("Explain protein folding", vec![]).await;
    }

    let transport = ScriptedTransport::new(vec![]);
    let chat = orchestrator(&dir, transport);
    assert_eq!(chat.sessions().len(), 1);
    assert_eq!(chat.sessions()[0].title, "Protein Analysis");
}
