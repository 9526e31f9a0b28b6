//! WebSocket broadcast server for Scenecast snapshots.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) pushing every serialized snapshot
//!   to all subscribers via [`tokio::sync::broadcast`], with the cached
//!   snapshot sent first on connect
//! - **REST endpoints** for the cached snapshot, one entity group of it,
//!   the live connection list and a health probe
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The tick pipeline writes the shared [`SnapshotCache`] and hands each
//! payload to [`AppState`] through the [`SnapshotSink`] trait. The
//! server side never triggers a scan: handshakes and REST reads only clone
//! the cached pointer. Each subscriber has a bounded queue; a subscriber
//! that falls behind skips the oldest payloads and never slows the others.
//!
//! [`SnapshotCache`]: scenecast_core::cache::SnapshotCache
//! [`SnapshotSink`]: scenecast_core::tick::SnapshotSink

pub mod connection;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{ObserverHandle, StartupError, spawn_observer};
pub use state::{AppState, ConnectionSettings};
