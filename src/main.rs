use std::sync::Arc;

use growthbase::config::ServerConfig;
use growthbase::routes;
use growthbase::state::AppState;
use growthbase::upstream::{ChatUpstream, UpstreamClient};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("invalid server config");

    // Non-fatal: the proxy answers 500 until the upstream is configured.
    let upstream = match UpstreamClient::from_env() {
        Ok(client) => {
            tracing::info!(endpoint = client.endpoint(), "upstream client initialized");
            Some(Arc::new(client) as Arc<dyn ChatUpstream>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "upstream not configured; chat proxy disabled");
            None
        }
    };

    let state = AppState::new(upstream);
    let app = match &config.static_dir {
        Some(dir) => routes::app_with_static(state, dir),
        None => routes::app(state),
    };

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "growthbase listening");
    axum::serve(listener, app).await.expect("server failed");
}
