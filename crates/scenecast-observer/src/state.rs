//! Shared application state for the broadcast server.
//!
//! [`AppState`] holds the broadcast channel that fans each serialized
//! snapshot out to subscribers as a ready-made text frame, the shared snapshot cache read on every
//! handshake, the live connection registry and the shutdown signal. The
//! tick pipeline reaches it only through the [`SnapshotSink`] trait.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::extract::ws::Utf8Bytes;
use scenecast_core::cache::{Payload, SnapshotCache};
use scenecast_core::config::NetworkConfig;
use scenecast_core::tick::SnapshotSink;
use scenecast_types::CloseReason;
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::connection::ConnectionRegistry;

/// Default per-subscriber queue depth.
///
/// A subscriber that falls further behind than this receives a
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest
/// payloads, so the oldest queued snapshots are the ones dropped.
pub const DEFAULT_OUTBOUND_QUEUE: usize = 16;

/// Per-connection liveness settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Close after this long without an inbound frame.
    pub idle_timeout: Option<Duration>,
    /// Send a ping this often.
    pub ping_interval: Option<Duration>,
    /// Close when one send takes longer than this.
    pub send_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for ConnectionSettings {
    fn from(config: &NetworkConfig) -> Self {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        Self {
            idle_timeout: secs(config.idle_timeout_secs),
            ping_interval: secs(config.ping_interval_secs),
            send_timeout: Duration::from_millis(config.send_timeout_ms.max(1)),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The same
/// `Arc` is handed to the tick pipeline as its [`SnapshotSink`].
#[derive(Debug)]
pub struct AppState {
    /// Broadcast sender for serialized snapshots. The frame text is built
    /// once per payload; every receiver clones a refcount.
    pub tx: broadcast::Sender<Utf8Bytes>,
    /// Last-known-good snapshot, sent first on every connection.
    pub cache: Arc<SnapshotCache>,
    /// Live subscriber connections.
    pub connections: ConnectionRegistry,
    /// Liveness settings applied to each connection.
    pub settings: ConnectionSettings,
    shutdown: watch::Sender<bool>,
    published: AtomicU64,
}

impl AppState {
    /// Create a state around an existing cache.
    pub fn new(cache: Arc<SnapshotCache>, settings: ConnectionSettings, queue: usize) -> Self {
        let (tx, _) = broadcast::channel(queue.max(1));
        let (shutdown, _) = watch::channel(false);
        Self {
            tx,
            cache,
            connections: ConnectionRegistry::new(),
            settings,
            shutdown,
            published: AtomicU64::new(0),
        }
    }

    /// Create a state from the network section of the configuration.
    pub fn from_config(cache: Arc<SnapshotCache>, config: &NetworkConfig) -> Self {
        Self::new(cache, ConnectionSettings::from(config), config.outbound_queue)
    }

    /// Subscribe to the snapshot broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<Utf8Bytes> {
        self.tx.subscribe()
    }

    /// Publish a payload to every subscriber.
    ///
    /// Returns the number of receivers it was queued for; zero when no
    /// one is connected, which is not an error.
    pub fn broadcast(&self, payload: &Payload) -> usize {
        self.published.fetch_add(1, Ordering::AcqRel);
        if self.tx.receiver_count() == 0 {
            return 0;
        }
        self.tx.send(frame_text(payload)).unwrap_or(0)
    }

    /// Number of payloads offered to subscribers so far.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// A receiver that flips to `true` on [`AppState::shutdown`].
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Whether [`AppState::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stop serving: every open connection moves to `Closed` and the
    /// server stops accepting.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        let closed = self.connections.close_all(CloseReason::Shutdown);
        info!(closed, "broadcast server shutting down");
    }
}

/// Text frame body for a payload.
pub fn frame_text(payload: &Payload) -> Utf8Bytes {
    Utf8Bytes::from(String::from(&**payload))
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(SnapshotCache::new()),
            ConnectionSettings::default(),
            DEFAULT_OUTBOUND_QUEUE,
        )
    }
}

impl SnapshotSink for AppState {
    fn publish(&self, payload: &Payload) -> usize {
        self.broadcast(payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_config() {
        let config = NetworkConfig {
            idle_timeout_secs: 0,
            ping_interval_secs: 5,
            send_timeout_ms: 250,
            ..NetworkConfig::default()
        };
        let settings = ConnectionSettings::from(&config);
        assert_eq!(settings.idle_timeout, None);
        assert_eq!(settings.ping_interval, Some(Duration::from_secs(5)));
        assert_eq!(settings.send_timeout, Duration::from_millis(250));
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let state = AppState::default();
        assert_eq!(state.publish(&Payload::from("{}")), 0);
        assert_eq!(state.published_count(), 1);
    }

    #[tokio::test]
    async fn subscribers_receive_the_same_payload() {
        let state = AppState::default();
        let mut a = state.subscribe();
        let mut b = state.subscribe();
        let payload = Payload::from(r#"{"timestamp":1}"#);
        assert_eq!(state.publish(&payload), 2);
        let got_a = a.recv().await.unwrap();
        let got_b = b.recv().await.unwrap();
        assert_eq!(got_a.as_str(), r#"{"timestamp":1}"#);
        // One buffer shared by every subscriber, not a copy each.
        assert_eq!(got_a.as_str().as_ptr(), got_b.as_str().as_ptr());
    }

    #[tokio::test]
    async fn slow_subscriber_drops_oldest() {
        let state = AppState::new(Arc::new(SnapshotCache::new()), ConnectionSettings::default(), 2);
        let mut rx = state.subscribe();
        for i in 0..5 {
            state.publish(&Payload::from(format!("{{\"tick\":{i}}}")));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap().as_str(), "{\"tick\":3}");
        assert_eq!(rx.recv().await.unwrap().as_str(), "{\"tick\":4}");
    }

    #[tokio::test]
    async fn shutdown_flips_the_signal_and_clears_connections() {
        let state = AppState::default();
        let mut signal = state.shutdown_signal();
        let id = state.connections.register();
        state.shutdown();
        signal.changed().await.unwrap();
        assert!(*signal.borrow());
        assert!(state.is_shut_down());
        assert!(!state.connections.contains(id));
    }
}
