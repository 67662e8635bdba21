//! Upstream: adapter for the hosted conversational-AI service.
//!
//! DESIGN
//! ======
//! The proxy handler talks to the [`ChatUpstream`] trait so tests can swap in
//! a fake. The concrete [`UpstreamClient`] is configured from environment
//! variables and currently speaks the Dify chat-messages API.

pub mod config;
pub mod dify;
pub mod types;

use config::DifyConfig;
pub use types::{ChatUpstream, ResponseMode, UpstreamError, UpstreamReply, UpstreamRequest, extract_reply};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete upstream client. Configured by [`UpstreamClient::from_env`].
pub struct UpstreamClient {
    inner: dify::DifyClient,
    streaming: bool,
}

impl UpstreamClient {
    /// Build an upstream client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, UpstreamError> {
        Self::from_config(&DifyConfig::from_env()?)
    }

    /// Build an upstream client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &DifyConfig) -> Result<Self, UpstreamError> {
        Ok(Self { inner: dify::DifyClient::new(config)?, streaming: config.streaming })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[async_trait::async_trait]
impl ChatUpstream for UpstreamClient {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
        if request.mode == ResponseMode::Streaming && !self.streaming {
            let blocking = UpstreamRequest { mode: ResponseMode::Blocking, ..request.clone() };
            return self.inner.chat_message(&blocking).await;
        }
        self.inner.chat_message(request).await
    }
}
