//! Dify chat-messages API client.
//!
//! Posts one query per call. In streaming mode the upstream's event-stream
//! body is handed back as a byte stream without reformatting; anything else
//! is read to completion and parsed as JSON.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use super::config::DifyConfig;
use super::types::{ResponseMode, UpstreamError, UpstreamReply, UpstreamRequest};

pub const EVENT_STREAM: &str = "text/event-stream";

pub struct DifyClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl DifyClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &DifyConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key.clone(), endpoint: config.endpoint.clone() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn chat_message(&self, request: &UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
        let body = DifyRequest {
            inputs: serde_json::Map::new(),
            query: &request.query,
            user: &request.user,
            response_mode: request.mode,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Response { status: status.as_u16(), body: text });
        }

        if request.mode == ResponseMode::Streaming && is_event_stream(response.headers().get(CONTENT_TYPE)) {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| UpstreamError::Request(e.to_string())))
                .boxed();
            return Ok(UpstreamReply::Stream(stream));
        }

        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;
        let data: Value = serde_json::from_str(&text).map_err(|e| UpstreamError::Parse(e.to_string()))?;
        Ok(UpstreamReply::Blocking(data))
    }
}

pub(crate) fn is_event_stream(value: Option<&reqwest::header::HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains(EVENT_STREAM))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct DifyRequest<'a> {
    inputs: serde_json::Map<String, Value>,
    query: &'a str,
    user: &'a str,
    response_mode: ResponseMode,
}

#[cfg(test)]
#[path = "dify_test.rs"]
mod tests;
