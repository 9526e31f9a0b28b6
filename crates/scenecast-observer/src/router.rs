//! Axum router construction for the broadcast server.
//!
//! Assembles the `WebSocket` endpoint and the REST routes into a single
//! [`Router`] with CORS and HTTP tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` snapshot stream
/// - `GET /api/snapshot` -- cached snapshot, verbatim
/// - `GET /api/snapshot/{category}` -- one entity group of the cached snapshot
/// - `GET /api/connections` -- live subscriber connections
/// - `GET /api/health` -- liveness probe
///
/// CORS allows any origin; the endpoint binds to loopback by default.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_snapshots))
        // REST API
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/snapshot/{category}", get(handlers::get_snapshot_category))
        .route("/api/connections", get(handlers::list_connections))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
