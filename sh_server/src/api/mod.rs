//! HTTP/WebSocket API for the shedding game server.
//!
//! Game traffic runs entirely over one WebSocket per client. The HTTP
//! routes exist for monitoring and room discovery.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: Middleware for CORS and request ids
//! - **Actor Model**: All room state is owned by the session actor task
//!
//! # Modules
//!
//! - [`websocket`]: The game protocol endpoint
//! - [`rooms`]: Room listing
//! - [`rate_limiter`]: Per-connection frame limits
//! - [`request_id`]: Request id propagation
//!
//! # Endpoints Overview
//!
//! - `GET /ws` - Establish WebSocket connection
//! - `GET /api/rooms` - List live rooms
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sh_server::api::{AppState, create_router};
//! use sh_server::api::rate_limiter::ConnectionLimits;
//! use shedding::room::{RoomConfig, SessionActor};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let (actor, sessions) = SessionActor::new(RoomConfig::default());
//! tokio::spawn(actor.run());
//!
//! let app = create_router(AppState::new(sessions, ConnectionLimits::default()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod rate_limiter;
pub mod request_id;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use shedding::room::SessionHandle;
use std::sync::{Arc, atomic::AtomicU64};
use tower_http::cors::CorsLayer;

use rate_limiter::ConnectionLimits;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is a handle or a shared counter.
#[derive(Clone)]
pub struct AppState {
    /// Channel into the session actor
    pub sessions: SessionHandle,
    pub limits: ConnectionLimits,
    /// Open WebSocket connections
    pub open_connections: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(sessions: SessionHandle, limits: ConnectionLimits) -> Self {
        Self {
            sessions,
            limits,
            open_connections: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET  /health                         - Health check
/// GET  /api/rooms                      - List rooms
/// GET  /ws                             - WebSocket game protocol
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .route("/api/rooms", get(rooms::list_rooms))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the session actor answers, `503 Service
/// Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","rooms":2,"connections":7,"players":6,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.sessions.stats().await;
    let healthy = stats.is_ok();
    let stats = stats.unwrap_or_default();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": stats.rooms,
        "connections": stats.connections,
        "players": stats.players,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
