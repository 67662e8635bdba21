//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One API endpoint (`/api/dify-chat`) plus a health probe. When a static
//! directory is configured the built browser client is served as the
//! fallback so the page and the proxy share an origin.

pub mod chat;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API routes without static file serving.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/dify-chat", post(chat::dify_chat))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes with the client bundle in `static_dir` served at `/`.
pub fn app_with_static(state: AppState, static_dir: &Path) -> Router {
    let site = ServeDir::new(static_dir).append_index_html_on_directories(true);
    app(state).fallback_service(site)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
