//! Chat proxy route.
//!
//! `POST /api/dify-chat` forwards the latest user message upstream and
//! answers with `{ reply }`, or relays the upstream event stream when the
//! caller asked for streaming and the upstream honoured it.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::Uri;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};

use crate::error::ProxyError;
use crate::state::AppState;
use crate::upstream::dify::EVENT_STREAM;
use crate::upstream::{ResponseMode, UpstreamReply, UpstreamRequest, extract_reply};
use crate::wire::{ChatRequestBody, ReplyBody, WireMessage, WireRole};

const ANONYMOUS_USER: &str = "anon";

/// Query flags of the chat route. Parsed leniently so a repeated or odd
/// parameter never rejects the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChatQuery {
    pub stream: Option<String>,
}

impl ChatQuery {
    /// First `stream` value wins; unknown pairs are ignored.
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let stream = raw.unwrap_or_default().split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == "stream").then(|| value.to_owned())
        });
        Self { stream }
    }

    fn wants_stream(&self) -> bool {
        self.stream
            .as_deref()
            .is_some_and(|v| matches!(v.trim(), "1" | "true"))
    }
}

/// `POST /api/dify-chat` proxies one chat turn to the upstream AI service.
pub async fn dify_chat(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let query = ChatQuery::parse(uri.query());
    let body: ChatRequestBody = serde_json::from_slice(&body).map_err(|e| ProxyError::Internal(e.to_string()))?;
    let Some(query_text) = latest_user_query(&body.messages) else {
        return Err(ProxyError::EmptyMessages);
    };
    let upstream = state.upstream.as_ref().ok_or(ProxyError::NotConfigured)?;

    let streaming = query.wants_stream() || body.stream == Some(true);
    let request = UpstreamRequest {
        query: query_text.to_owned(),
        user: body
            .user_id
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USER)
            .to_owned(),
        mode: if streaming { ResponseMode::Streaming } else { ResponseMode::Blocking },
    };
    tracing::debug!(
        user = %request.user,
        model = body.model.as_deref().unwrap_or("default"),
        history = body.messages.len(),
        streaming,
        "forwarding chat turn"
    );

    match upstream.send(&request).await? {
        UpstreamReply::Blocking(data) => Ok(Json(ReplyBody { reply: extract_reply(&data) }).into_response()),
        UpstreamReply::Stream(stream) => {
            tracing::debug!(user = %request.user, "relaying upstream event stream");
            Ok(([(CONTENT_TYPE, EVENT_STREAM), (CACHE_CONTROL, "no-cache")], Body::from_stream(stream)).into_response())
        }
    }
}

/// Pick the query text: the most recent user message, or the last message
/// when no user message exists. `None` only for an empty list.
pub(crate) fn latest_user_query(messages: &[WireMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == WireRole::User)
        .or_else(|| messages.last())
        .map(|m| m.content.as_str())
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
