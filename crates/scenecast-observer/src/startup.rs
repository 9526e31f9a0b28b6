//! Startup helper for embedding the broadcast server in the engine.
//!
//! [`spawn_observer`] binds the port eagerly, then runs the server on a
//! background Tokio task. A bind failure is returned to the caller before
//! anything is spawned, so the engine can carry on without the network.
//!
//! # Usage
//!
//! ```rust,ignore
//! use scenecast_observer::server::ServerConfig;
//! use scenecast_observer::startup::spawn_observer;
//! use scenecast_observer::state::AppState;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::default());
//! let handle = spawn_observer(&ServerConfig::default(), Arc::clone(&state)).await?;
//! // ... run ticks ...
//! state.shutdown();
//! handle.task.await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),

    /// The bound listener reported no local address.
    #[error("listener address unavailable: {0}")]
    Address(#[from] std::io::Error),
}

/// A running background server.
#[derive(Debug)]
pub struct ObserverHandle {
    /// The address actually bound (useful with port `0`).
    pub local_addr: SocketAddr,
    /// The serving task; completes after [`AppState::shutdown`].
    pub task: JoinHandle<()>,
}

/// Bind the configured address and serve on a background task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandle, StartupError> {
    let listener = server::bind(config).await?;
    let local_addr = listener.local_addr()?;

    let task = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "broadcast server exited with error");
        }
    });

    tracing::info!(%local_addr, "broadcast server spawned on background task");

    Ok(ObserverHandle { local_addr, task })
}
