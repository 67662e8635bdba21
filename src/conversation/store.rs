//! Local conversation store.
//!
//! Pure load/save of the full conversation collection under one versioned
//! key. Nothing here raises: malformed or unreadable data loads as empty,
//! and failed writes (quota included) are logged and dropped without retry.

use super::Conversation;
use super::storage::KeyValueStorage;

pub const CONVERSATIONS_KEY: &str = "gb.chats.v1";
pub const MODEL_KEY: &str = "gb-model";

/// A selectable model entry for the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

pub static MODELS: [ModelOption; 3] = [
    ModelOption { id: "gpt-4o-mini", label: "Fast (4o-mini)" },
    ModelOption { id: "gpt-4o", label: "Balanced (4o)" },
    ModelOption { id: "gpt-5-think", label: "Reasoning (GPT-5 Thinking)" },
];

pub struct ConversationStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> ConversationStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted collection in stored order. Records that do not
    /// parse are skipped; a document that is not an array loads as empty.
    pub fn load(&self) -> Vec<Conversation> {
        let raw = match self.storage.get_item(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = CONVERSATIONS_KEY, "conversation load failed");
                return Vec::new();
            }
        };
        let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, key = CONVERSATIONS_KEY, "discarding malformed conversation data");
                return Vec::new();
            }
        };
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Conversation>(record) {
                Ok(conversation) => Some(conversation),
                Err(e) => {
                    tracing::warn!(error = %e, index, "skipping unreadable conversation record");
                    None
                }
            })
            .collect()
    }

    /// Persist the full collection. Failures are swallowed.
    pub fn save(&self, conversations: &[Conversation]) {
        let raw = match serde_json::to_string(conversations) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "conversation serialize failed");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(CONVERSATIONS_KEY, &raw) {
            tracing::warn!(error = %e, key = CONVERSATIONS_KEY, "conversation save dropped");
        }
    }

    /// Stored model id if it is a known option, otherwise the first option.
    pub fn load_model(&self) -> &'static str {
        let stored = self.storage.get_item(MODEL_KEY).ok().flatten();
        stored
            .and_then(|id| MODELS.iter().find(|m| m.id == id))
            .unwrap_or(&MODELS[0])
            .id
    }

    /// Persist the model choice. Unknown ids are ignored.
    pub fn save_model(&self, model_id: &str) -> bool {
        if !MODELS.iter().any(|m| m.id == model_id) {
            return false;
        }
        if let Err(e) = self.storage.set_item(MODEL_KEY, model_id) {
            tracing::warn!(error = %e, key = MODEL_KEY, "model preference save dropped");
        }
        true
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
