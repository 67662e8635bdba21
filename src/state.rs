//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! proxy keeps no conversation data of its own; the only shared resource is
//! the upstream client.

use std::sync::Arc;

use crate::upstream::ChatUpstream;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Optional upstream client. `None` if the upstream env vars are not configured.
    pub upstream: Option<Arc<dyn ChatUpstream>>,
}

impl AppState {
    #[must_use]
    pub fn new(upstream: Option<Arc<dyn ChatUpstream>>) -> Self {
        Self { upstream }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use bytes::Bytes;
    use futures::StreamExt;
    use serde_json::Value;

    use super::*;
    use crate::upstream::{UpstreamError, UpstreamReply, UpstreamRequest};

    /// Scripted upstream answer for [`MockUpstream`].
    pub enum MockAnswer {
        Blocking(Value),
        Stream(Vec<&'static str>),
        Status(u16, &'static str),
        Transport(&'static str),
    }

    /// Upstream fake that records every request it receives.
    pub struct MockUpstream {
        answer: MockAnswer,
        pub requests: Mutex<Vec<UpstreamRequest>>,
    }

    impl MockUpstream {
        pub fn new(answer: MockAnswer) -> Arc<Self> {
            Arc::new(Self { answer, requests: Mutex::new(Vec::new()) })
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl ChatUpstream for MockUpstream {
        async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.answer {
                MockAnswer::Blocking(data) => Ok(UpstreamReply::Blocking(data.clone())),
                MockAnswer::Stream(chunks) => {
                    let items: Vec<Result<Bytes, UpstreamError>> =
                        chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect();
                    Ok(UpstreamReply::Stream(futures::stream::iter(items).boxed()))
                }
                MockAnswer::Status(status, body) => {
                    Err(UpstreamError::Response { status: *status, body: (*body).to_string() })
                }
                MockAnswer::Transport(message) => Err(UpstreamError::Request((*message).to_string())),
            }
        }
    }

    /// Create a test `AppState` without an upstream.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(None)
    }

    /// Create a test `AppState` backed by a mock upstream.
    #[must_use]
    pub fn test_app_state_with_upstream(upstream: Arc<MockUpstream>) -> AppState {
        let upstream: Arc<dyn ChatUpstream> = upstream;
        AppState::new(Some(upstream))
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
