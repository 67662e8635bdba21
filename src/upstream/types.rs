//! Upstream types: request/reply shapes and errors for the hosted AI API.
//!
//! The proxy only ever sends one query per call, so the request type is
//! deliberately flat. Replies are either a parsed JSON document or the raw
//! event-stream body, relayed untouched.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by upstream client operations.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the upstream failed before a response arrived.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// The upstream returned a non-success HTTP status.
    #[error("upstream response error: status {status}")]
    Response { status: u16, body: String },

    /// The upstream returned 2xx but the body was not valid JSON.
    #[error("upstream response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REQUEST
// =============================================================================

/// How the upstream should answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Blocking,
    Streaming,
}

/// A single query forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub query: String,
    pub user: String,
    pub mode: ResponseMode,
}

// =============================================================================
// REPLY
// =============================================================================

/// What the upstream answered with.
pub enum UpstreamReply {
    /// A complete JSON document (blocking mode, or streaming not honoured).
    Blocking(Value),
    /// Raw event-stream bytes, in arrival order.
    Stream(BoxStream<'static, Result<Bytes, UpstreamError>>),
}

impl std::fmt::Debug for UpstreamReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking(value) => f.debug_tuple("Blocking").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Field names checked, in order, for the reply text of a blocking answer.
pub const REPLY_FIELDS: [&str; 2] = ["answer", "output_text"];

/// Extract the reply text from a blocking upstream answer.
///
/// Falls back through [`REPLY_FIELDS`]; if none is present (or all are
/// `null`) the whole document is serialized. Non-string values are
/// serialized as JSON.
#[must_use]
pub fn extract_reply(data: &Value) -> String {
    REPLY_FIELDS
        .iter()
        .find_map(|field| data.get(*field).filter(|v| !v.is_null()))
        .map_or_else(|| data.to_string(), json_text)
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// UPSTREAM TRAIT
// =============================================================================

/// Provider-neutral async trait for the hosted AI service. Enables mocking.
#[async_trait::async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Forward one query upstream.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Response`] for non-2xx answers (carrying the raw
    /// body), and other variants for transport or parse failures.
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, UpstreamError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
