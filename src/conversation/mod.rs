//! Conversation model: messages, conversations, and the in-memory list.
//!
//! DESIGN
//! ======
//! The in-memory [`ConversationList`] is the single source of truth during a
//! session. Every mutation goes through it and the store only ever receives
//! full snapshots, so the next persisted state is never derived from a stale
//! copy re-read from storage.
//!
//! INVARIANTS
//! ==========
//! - Messages keep insertion order; only the newest assistant message grows.
//! - Message timestamps never decrease within a conversation.
//! - Conversation ids are unique and at least one conversation exists.

pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "New chat";
pub const GREETING: &str = "New chat. How can I help?";
pub const TITLE_MAX_CHARS: usize = 50;

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    i64::try_from(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

/// Fresh opaque identifier for messages and conversations.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// =============================================================================
// MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: i64,
}

// =============================================================================
// CONVERSATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// A fresh conversation holding only the greeting.
    #[must_use]
    pub fn new(now: i64) -> Self {
        let mut conversation = Self {
            id: new_id(),
            title: DEFAULT_TITLE.to_owned(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        conversation.push(Role::Assistant, GREETING, now);
        conversation
    }

    /// Append a message and return its id. The timestamp is clamped so it
    /// never precedes the previous message.
    pub fn push(&mut self, role: Role, content: impl Into<String>, now: i64) -> String {
        let created_at = self.messages.last().map_or(now, |last| now.max(last.created_at));
        let id = new_id();
        self.messages.push(Message { id: id.clone(), role, content: content.into(), created_at });
        self.touch(now);
        id
    }

    /// Grow the newest message in place. Only the newest assistant message may
    /// grow; returns `false` (and changes nothing) for any other target.
    pub fn append_to(&mut self, message_id: &str, text: &str, now: i64) -> bool {
        let Some(last) = self.messages.last_mut() else {
            return false;
        };
        if last.id != message_id || last.role != Role::Assistant {
            return false;
        }
        last.content.push_str(text);
        self.touch(now);
        true
    }

    /// Derive the title from the first user message while the title is still
    /// the placeholder. Returns whether the title changed.
    pub fn derive_title(&mut self, text: &str) -> bool {
        if self.title != DEFAULT_TITLE {
            return false;
        }
        let title = derive_title(text);
        if title.is_empty() {
            return false;
        }
        self.title = title;
        true
    }

    #[must_use]
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    fn touch(&mut self, now: i64) {
        self.updated_at = self.updated_at.max(now);
    }
}

/// First [`TITLE_MAX_CHARS`] characters of the trimmed text.
#[must_use]
pub fn derive_title(text: &str) -> String {
    text.trim()
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_owned()
}

// =============================================================================
// CONVERSATION LIST
// =============================================================================

/// Ordered collection of conversations with one active entry.
#[derive(Debug, Clone)]
pub struct ConversationList {
    items: Vec<Conversation>,
    active: usize,
}

impl ConversationList {
    /// Build the session list from whatever the store produced. Duplicate ids
    /// are dropped (first wins); an empty result synthesizes a default
    /// conversation. The most recently updated conversation becomes active.
    #[must_use]
    pub fn from_loaded(loaded: Vec<Conversation>, now: i64) -> Self {
        let mut items: Vec<Conversation> = Vec::with_capacity(loaded.len());
        for conversation in loaded {
            if items.iter().any(|c| c.id == conversation.id) {
                tracing::warn!(id = %conversation.id, "dropping duplicate conversation id");
                continue;
            }
            items.push(conversation);
        }
        if items.is_empty() {
            items.push(Conversation::new(now));
        }
        let mut list = Self { items, active: 0 };
        list.active = list.most_recent_index();
        list
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Conversations in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[Conversation] {
        &self.items
    }

    /// Conversations sorted by `updated_at`, newest first.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Conversation> {
        let mut sorted: Vec<&Conversation> = self.items.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sorted
    }

    #[must_use]
    pub fn active(&self) -> &Conversation {
        &self.items[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Conversation {
        &mut self.items[self.active]
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.items.iter_mut().find(|c| c.id == id)
    }

    /// Start a new conversation, make it active, and return its id.
    pub fn new_chat(&mut self, now: i64) -> String {
        let conversation = Conversation::new(now);
        let id = conversation.id.clone();
        self.items.insert(0, conversation);
        self.active = 0;
        id
    }

    /// Make `id` the active conversation.
    pub fn select(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// User rename. Blank titles are rejected.
    pub fn rename(&mut self, id: &str, title: &str, now: i64) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(conversation) = self.get_mut(id) else {
            return false;
        };
        title.clone_into(&mut conversation.title);
        conversation.touch(now);
        true
    }

    /// Remove a conversation. Deleting the last one leaves a fresh default
    /// conversation behind; deleting the active one activates the most
    /// recently updated survivor.
    pub fn delete(&mut self, id: &str, now: i64) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let active_id = self.active().id.clone();
        self.items.remove(index);
        if self.items.is_empty() {
            self.items.push(Conversation::new(now));
        }
        self.active = if active_id == id {
            self.most_recent_index()
        } else {
            self.position(&active_id).unwrap_or(0)
        };
        true
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|c| c.id == id)
    }

    fn most_recent_index(&self) -> usize {
        self.items
            .iter()
            .enumerate()
            .max_by_key(|(index, c)| (c.updated_at, std::cmp::Reverse(*index)))
            .map_or(0, |(index, _)| index)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
