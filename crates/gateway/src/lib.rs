//! HTTP API gateway for GSTMate.
//!
//! Exposes the chat, upload, reset, and profile endpoints plus a health
//! check and the embedded frontend.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod frontend;
pub mod pdf;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use gstmate_advisor::AdvisorEngine;
use gstmate_session::SessionStore;

pub use api::{GatewayState, SharedState};

/// Maximum accepted request body (PDF uploads included).
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the full application router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::api_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: gstmate_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let router = gstmate_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .expect("No default provider configured — set an API key");

    let store = Arc::new(SessionStore::new(config.session.max_history_turns));
    let engine = AdvisorEngine::new(provider, store.clone(), &config);

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let state = Arc::new(GatewayState {
        config,
        engine,
        store,
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = Router::new().route("/health", get(health_handler));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
