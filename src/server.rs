//! Server setup: router, CORS, listener

use crate::handlers::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Create the axum application.
///
/// CORS is fully permissive: the endpoint is meant to be called from any
/// origin, and the preflight OPTIONS probe is answered by the layer itself.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/render", post(handlers::render_scene))
        .route("/api/health", get(handlers::health))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind and serve until the process is stopped
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = TcpListener::bind(addr).await?;
    info!("sceneshot listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
