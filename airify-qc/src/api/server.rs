//! HTTP server setup and routing

use crate::error::{Error, Result};
use crate::provider::{Playlist, Session};
use crate::queue::QueueEngine;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Run-wide facts reported by the control summary
#[derive(Debug, Clone)]
pub struct ControlInfo {
    pub playlist_uri: String,
    pub playlist_name: String,
    pub session_user: String,
    pub session_opened_at: DateTime<Utc>,
    /// `host:port` of the output device
    pub device: String,
}

impl ControlInfo {
    pub fn new(playlist: &Playlist, session: &Session, device: impl Into<String>) -> Self {
        Self {
            playlist_uri: playlist.uri.clone(),
            playlist_name: playlist.name.clone(),
            session_user: session.user.clone(),
            session_opened_at: session.opened_at,
            device: device.into(),
        }
    }
}

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub queue: Arc<QueueEngine>,
    pub state: Arc<SharedState>,
    pub info: Arc<ControlInfo>,
}

/// Build the router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .nest(
            "/api",
            Router::new()
                .route("/control", get(super::handlers::get_control))
                .route("/queue", get(super::handlers::get_queue))
                .route("/vote/:track_id/:direction", post(super::handlers::vote))
                .route("/events", get(super::sse::event_stream))
                .route("/build_info", get(super::handlers::get_build_info)),
        )
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for browser clients on other origins
        .layer(CorsLayer::permissive())
}

/// Serve the control API until `shutdown` resolves
pub async fn run<F>(addr: SocketAddr, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(ctx);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
