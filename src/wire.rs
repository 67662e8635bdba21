//! JSON shapes exchanged between the chat client and the proxy endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// Role of a message on the wire. `system` is accepted from callers but the
/// client never produces it. Any other role is carried as `Other` and never
/// chosen as the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
    System,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

/// Body of `POST /api/dify-chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<WireMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WireMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<WireMessage>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Successful non-streaming answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyBody {
    pub reply: String,
}
