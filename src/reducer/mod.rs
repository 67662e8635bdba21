//! Reducer: the streaming reply state machine behind one chat session.
//!
//! DESIGN
//! ======
//! A [`ChatSession`] owns the conversation list, the store, and the
//! transport. `send` drives one turn end to end:
//!
//! ```text
//! Idle ─► AwaitingResponse ─┬─► Streaming ─┐
//!                           └─► Revealing ─┴─► Idle
//! ```
//!
//! Any non-idle phase can exit early through cancellation (terminal
//! "stopped" message) or failure (terminal "network error" message). The
//! finally path always returns to `Idle` and clears the stop handle.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every mutation is applied to the in-memory list first, then written to
//! the store as a full snapshot, then announced as a [`SessionEvent`] so a
//! renderer can redraw. The store is write-only from here; it is read once
//! at session start.
//!
//! TRADE-OFFS
//! ==========
//! Cancellation is cooperative: the request, each chunk read, and each
//! reveal tick race the token, so bytes already buffered when Stop fires
//! are dropped rather than appended.

pub mod decode;
pub mod reveal;
pub mod transport;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::conversation::store::{ConversationStore, MODELS};
use crate::conversation::storage::KeyValueStorage;
use crate::conversation::{Conversation, ConversationList, Role, now_ms};
use crate::wire::{ChatRequestBody, WireMessage, WireRole};
use decode::Utf8ChunkDecoder;
use transport::{ChatReply, ChatTransport, TransportError, extract_client_reply};

pub const STOPPED_MESSAGE: &str = "…stopped.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error contacting AI.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
    Streaming,
    Revealing,
}

impl Phase {
    #[must_use]
    pub fn in_flight(self) -> bool {
        self != Self::Idle
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SendError {
    #[error("message is empty")]
    Empty,
    #[error("a reply is already in flight")]
    InFlight,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Completed,
    Stopped,
    Failed,
}

/// Render notifications, emitted after the change is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    MessageAppended { conversation_id: String, message_id: String },
    MessageGrew { conversation_id: String, message_id: String },
    ConversationsChanged,
}

/// Shared slot for the in-flight turn's cancellation token.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl StopHandle {
    /// Cancel the in-flight turn. Returns `false` when nothing is in flight.
    pub fn stop(&self) -> bool {
        match self.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn arm(&self, token: CancellationToken) {
        *self.lock() = Some(token);
    }

    pub(crate) fn disarm(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum TurnError {
    Cancelled,
    Transport(TransportError),
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ChatSession<S> {
    list: ConversationList,
    store: ConversationStore<S>,
    transport: Arc<dyn ChatTransport>,
    phase: Phase,
    user_id: Option<String>,
    model: &'static str,
    stop: StopHandle,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    reveal_tick: Duration,
}

impl<S: KeyValueStorage> ChatSession<S> {
    /// Open a session over whatever the store holds.
    pub fn open(store: ConversationStore<S>, transport: Arc<dyn ChatTransport>, user_id: Option<String>) -> Self {
        let list = ConversationList::from_loaded(store.load(), now_ms());
        let model = store.load_model();
        info!(conversations = list.len(), model, "chat session opened");
        Self {
            list,
            store,
            transport,
            phase: Phase::Idle,
            user_id,
            model,
            stop: StopHandle::default(),
            events: None,
            reveal_tick: reveal::REVEAL_TICK,
        }
    }

    /// Override the reveal pacing.
    #[must_use]
    pub fn with_reveal_tick(mut self, tick: Duration) -> Self {
        self.reveal_tick = tick;
        self
    }

    /// Receive render events. Replaces any previous subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.phase.in_flight()
    }

    #[must_use]
    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Conversation operations
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn active(&self) -> &Conversation {
        self.list.active()
    }

    #[must_use]
    pub fn list(&self) -> &ConversationList {
        &self.list
    }

    /// Conversations newest first.
    #[must_use]
    pub fn conversations(&self) -> Vec<&Conversation> {
        self.list.sorted()
    }

    pub fn new_chat(&mut self) -> String {
        let id = self.list.new_chat(now_ms());
        self.persist();
        self.emit(SessionEvent::ConversationsChanged);
        id
    }

    pub fn select(&mut self, id: &str) -> bool {
        let changed = self.list.select(id);
        if changed {
            self.emit(SessionEvent::ConversationsChanged);
        }
        changed
    }

    pub fn rename(&mut self, id: &str, title: &str) -> bool {
        let changed = self.list.rename(id, title, now_ms());
        if changed {
            self.persist();
            self.emit(SessionEvent::ConversationsChanged);
        }
        changed
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let changed = self.list.delete(id, now_ms());
        if changed {
            self.persist();
            self.emit(SessionEvent::ConversationsChanged);
        }
        changed
    }

    #[must_use]
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Switch the model preference. Unknown ids are ignored.
    pub fn set_model(&mut self, model_id: &str) -> bool {
        let Some(option) = MODELS.iter().find(|m| m.id == model_id) else {
            return false;
        };
        self.model = option.id;
        self.store.save_model(option.id)
    }

    // -------------------------------------------------------------------------
    // Send
    // -------------------------------------------------------------------------

    /// Run one turn: append the user message, ask the proxy, and grow the
    /// assistant reply until it completes, fails, or is stopped.
    ///
    /// # Errors
    ///
    /// Rejects blank text and overlapping sends. Transport failures are not
    /// errors; they end the turn with a terminal assistant message.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::Empty);
        }
        if self.in_flight() {
            return Err(SendError::InFlight);
        }

        let conversation_id = self.list.active().id.clone();
        {
            let conversation = self.list.active_mut();
            conversation.push(Role::User, text, now_ms());
            conversation.derive_title(text);
        }
        self.appended(&conversation_id);

        let token = CancellationToken::new();
        self.stop.arm(token.clone());
        self.set_phase(Phase::AwaitingResponse);

        let outcome = match self.run_turn(&conversation_id, &token).await {
            Ok(()) => SendOutcome::Completed,
            Err(TurnError::Cancelled) => {
                info!(%conversation_id, "reply stopped by user");
                self.push_assistant(&conversation_id, STOPPED_MESSAGE);
                SendOutcome::Stopped
            }
            Err(TurnError::Transport(e)) => {
                warn!(%conversation_id, error = %e, "reply failed");
                self.push_assistant(&conversation_id, NETWORK_ERROR_MESSAGE);
                SendOutcome::Failed
            }
        };

        self.stop.disarm();
        self.set_phase(Phase::Idle);
        Ok(outcome)
    }

    async fn run_turn(&mut self, conversation_id: &str, token: &CancellationToken) -> Result<(), TurnError> {
        let body = self.request_body(conversation_id);
        let transport = Arc::clone(&self.transport);
        let reply = tokio::select! {
            () = token.cancelled() => return Err(TurnError::Cancelled),
            reply = transport.post_chat(&body) => reply.map_err(TurnError::Transport)?,
        };

        match reply {
            ChatReply::Stream(mut stream) => {
                self.set_phase(Phase::Streaming);
                let message_id = self.push_assistant(conversation_id, "");
                let mut decoder = Utf8ChunkDecoder::new();
                loop {
                    let chunk = tokio::select! {
                        () = token.cancelled() => return Err(TurnError::Cancelled),
                        chunk = stream.next() => chunk,
                    };
                    let Some(chunk) = chunk else { break };
                    let bytes = chunk.map_err(TurnError::Transport)?;
                    let text = decoder.decode(&bytes);
                    self.grow(conversation_id, &message_id, &text);
                }
                let tail = decoder.finish();
                self.grow(conversation_id, &message_id, &tail);
                debug!(%conversation_id, "stream reply complete");
            }
            ChatReply::Json(data) => {
                self.set_phase(Phase::Revealing);
                let reply = extract_client_reply(&data);
                let message_id = self.push_assistant(conversation_id, "");
                for slice in reveal::slices(&reply) {
                    tokio::select! {
                        () = token.cancelled() => return Err(TurnError::Cancelled),
                        () = tokio::time::sleep(self.reveal_tick) => {}
                    }
                    self.grow(conversation_id, &message_id, slice);
                }
                debug!(%conversation_id, chars = reply.chars().count(), "json reply revealed");
            }
        }
        Ok(())
    }

    /// Full history of the conversation as role/content pairs.
    fn request_body(&self, conversation_id: &str) -> ChatRequestBody {
        let messages = self
            .list
            .get(conversation_id)
            .map(|c| {
                c.messages
                    .iter()
                    .map(|m| WireMessage {
                        role: match m.role {
                            Role::User => WireRole::User,
                            Role::Assistant => WireRole::Assistant,
                        },
                        content: m.content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        ChatRequestBody {
            messages,
            user_id: self.user_id.clone(),
            stream: None,
            model: Some(self.model.to_owned()),
        }
    }

    // -------------------------------------------------------------------------
    // Mutation helpers
    // -------------------------------------------------------------------------

    fn push_assistant(&mut self, conversation_id: &str, content: &str) -> String {
        let Some(conversation) = self.list.get_mut(conversation_id) else {
            return String::new();
        };
        let message_id = conversation.push(Role::Assistant, content, now_ms());
        self.appended(conversation_id);
        message_id
    }

    fn grow(&mut self, conversation_id: &str, message_id: &str, text: &str) {
        if text.is_empty() {
            return;
        }
        let grew = self
            .list
            .get_mut(conversation_id)
            .is_some_and(|c| c.append_to(message_id, text, now_ms()));
        if grew {
            self.persist();
            self.emit(SessionEvent::MessageGrew {
                conversation_id: conversation_id.to_owned(),
                message_id: message_id.to_owned(),
            });
        }
    }

    fn appended(&mut self, conversation_id: &str) {
        let Some(message_id) = self
            .list
            .get(conversation_id)
            .and_then(|c| c.messages.last())
            .map(|m| m.id.clone())
        else {
            return;
        };
        self.persist();
        self.emit(SessionEvent::MessageAppended { conversation_id: conversation_id.to_owned(), message_id });
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    fn persist(&self) {
        self.store.save(self.list.as_slice());
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                self.events = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
