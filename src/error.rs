//! Proxy error type.
//!
//! The chat handler returns `Result<T, ProxyError>`; [`IntoResponse`] turns
//! each variant into the JSON error body the browser client expects.
//! Nothing escapes the handler unconverted.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::upstream::UpstreamError;

/// Errors surfaced by `POST /api/dify-chat`.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The request carried no messages.
    #[error("No messages provided")]
    EmptyMessages,

    /// The upstream answered with a non-2xx status.
    #[error("Dify error")]
    Upstream { status: u16, detail: String },

    /// No upstream client is configured.
    #[error("AI service not configured")]
    NotConfigured,

    /// Anything else: bad body, transport failure, unparseable upstream answer.
    #[error("{0}")]
    Internal(String),
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Response { status, body } => Self::Upstream { status, detail: body },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// JSON error body: `{ error, detail? }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, detail) = match self {
            Self::EmptyMessages => (StatusCode::BAD_REQUEST, None),
            Self::Upstream { status, detail } => {
                tracing::warn!(upstream_status = status, "upstream returned an error");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(detail))
            }
            Self::NotConfigured | Self::Internal(_) => {
                tracing::error!(error = %message, "chat proxy failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        (status, Json(ErrorBody { error: message, detail })).into_response()
    }
}
