//! Client side of the proxy endpoint.
//!
//! The session talks to [`ChatTransport`] so tests can substitute a fake.
//! [`HttpTransport`] posts to `<base>/api/dify-chat?stream=1` and decides
//! between the stream and JSON branches from the response alone.

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::upstream::dify::is_event_stream;
use crate::wire::ChatRequestBody;

pub const CHAT_PATH: &str = "/api/dify-chat?stream=1";
pub const FALLBACK_REPLY: &str = "Sorry, I didn’t get that.";

/// Fields inspected, in order, for the reply text of a JSON response.
const CLIENT_REPLY_FIELDS: [&str; 3] = ["reply", "answer", "output_text"];

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("response body failed: {0}")]
    Body(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// How the proxy answered.
pub enum ChatReply {
    /// Event-stream body; chunks are raw bytes in receive order.
    Stream(BoxStream<'static, Result<Bytes, TransportError>>),
    /// Any other response, parsed as JSON (`{}` when unparseable).
    Json(Value),
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("ChatReply::Stream(..)"),
            Self::Json(value) => f.debug_tuple("ChatReply::Json").field(value).finish(),
        }
    }
}

/// Transport seam between the session and the proxy.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, body: &ChatRequestBody) -> Result<ChatReply, TransportError>;
}

/// Reply text from a JSON response: the first non-empty string among
/// `reply`, `answer`, `output_text`, else the fallback apology.
#[must_use]
pub fn extract_client_reply(data: &Value) -> String {
    CLIENT_REPLY_FIELDS
        .iter()
        .filter_map(|field| data.get(field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_owned()
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Transport for the proxy served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::HttpClientBuild(e.to_string()))?;
        let url = format!("{}{CHAT_PATH}", base_url.trim_end_matches('/'));
        Ok(Self { http, url })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, body: &ChatRequestBody) -> Result<ChatReply, TransportError> {
        let response = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() && is_event_stream(response.headers().get(CONTENT_TYPE)) {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::Body(e.to_string())))
                .boxed();
            return Ok(ChatReply::Stream(stream));
        }

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "chat proxy returned non-success status");
        }
        // An unreadable body is treated like an unparseable one.
        let text = response.text().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "chat proxy body read failed");
            String::new()
        });
        let data = serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Ok(ChatReply::Json(data))
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
