//! REST endpoint handlers for the broadcast server.
//!
//! Every handler reads the shared snapshot cache or the connection
//! registry; none triggers a scan.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/snapshot` | Cached snapshot payload, verbatim |
//! | `GET` | `/api/snapshot/{category}` | One entity group from the cache |
//! | `GET` | `/api/connections` | Live subscriber connections |
//! | `GET` | `/api/health` | Liveness probe |

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use scenecast_types::{ConnectionInfo, EntityCategory};
use serde_json::Value;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let subscribers = state.connections.open_count();
    let published = state.published_count();
    let status = if state.cache.has_snapshot() {
        "LIVE"
    } else {
        "WAITING FOR FIRST SNAPSHOT"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Scenecast</title>
<style>
body {{ font-family: monospace; margin: 2rem; }}
dt {{ font-weight: bold; }}
dd {{ margin: 0 0 0.75rem 0; }}
</style>
</head>
<body>
<h1>Scenecast</h1>
<dl>
<dt>Status</dt><dd>{status}</dd>
<dt>Subscribers</dt><dd>{subscribers}</dd>
<dt>Snapshots published</dt><dd>{published}</dd>
</dl>
<p>
<a href="/api/snapshot">/api/snapshot</a> |
<a href="/api/snapshot/tree">/api/snapshot/{{category}}</a> |
<a href="/api/connections">/api/connections</a> |
<a href="/api/health">/api/health</a> |
ws: /ws
</p>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/snapshot
// ---------------------------------------------------------------------------

/// Return the cached payload exactly as subscribers receive it.
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let payload = state.cache.read();
    (
        [(header::CONTENT_TYPE, "application/json")],
        String::from(&*payload),
    )
}

// ---------------------------------------------------------------------------
// GET /api/snapshot/{category}
// ---------------------------------------------------------------------------

/// Return one entity group of the cached snapshot.
///
/// An empty array is returned before the first snapshot or when the
/// player was absent on the last published tick.
pub async fn get_snapshot_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Value>, ObserverError> {
    let category = EntityCategory::from_str(&category)?;

    let payload = state.cache.read();
    let mut snapshot: Value = serde_json::from_str(&payload)?;
    let group = snapshot
        .get_mut(category.snapshot_field())
        .map_or_else(|| Value::Array(Vec::new()), Value::take);
    Ok(Json(group))
}

// ---------------------------------------------------------------------------
// GET /api/connections
// ---------------------------------------------------------------------------

/// List live subscriber connections, oldest first.
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<Vec<ConnectionInfo>> {
    Json(state.connections.list())
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Liveness probe with subscriber and publish counters.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.connections.open_count(),
        "published": state.published_count(),
        "has_snapshot": state.cache.has_snapshot(),
    }))
}
