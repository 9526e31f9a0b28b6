//! The per-tick pipeline: scan, assemble, serialize, cache, broadcast.
//!
//! [`Publisher`] is the lifecycle-scoped state object owning the chat ring
//! and holding the shared snapshot cache. Its two synchronous entry points
//! are [`Publisher::on_tick`] and [`Publisher::on_chat_message`]; both run
//! to completion on the tick thread and never wait on the network.
//!
//! Ordering within one tick is fixed: the cache is updated before the
//! payload is handed to the sink, so a subscriber that subscribes and then
//! reads the cache can see a payload twice but never miss one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::assembler::{self, AssembleError};
use crate::cache::{Payload, SnapshotCache};
use crate::chat::ChatLog;
use crate::scanner::{self, ScanError, ScanOutput};
use crate::world::WorldView;

/// Receives each serialized snapshot for fan-out to subscribers.
///
/// Implemented by the network layer. `publish` must not block: it hands
/// the payload to per-subscriber queues and returns.
pub trait SnapshotSink: Send + Sync {
    /// Offer a payload to all current subscribers. Returns how many
    /// subscribers it was queued for.
    fn publish(&self, payload: &Payload) -> usize;
}

/// A sink that drops every payload, used when the network is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl SnapshotSink for NoOpSink {
    fn publish(&self, _payload: &Payload) -> usize {
        0
    }
}

/// Errors that end one tick without a snapshot update.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The scan could not run.
    #[error("scan skipped: {source}")]
    Scan {
        /// The underlying scan error.
        #[from]
        source: ScanError,
    },

    /// The snapshot could not be serialized.
    #[error("assembly failed: {source}")]
    Assemble {
        /// The underlying assembly error.
        #[from]
        source: AssembleError,
    },

    /// The publisher has been shut down.
    #[error("publisher is stopped")]
    Stopped,
}

impl TickError {
    /// True when the tick was skipped because the world was not ready,
    /// as opposed to a real failure.
    pub const fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::Scan {
                source: ScanError::NoLocalPlayer
            }
        )
    }
}

/// Summary of one completed tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Sequence number of this tick, starting at 1.
    pub tick: u64,
    /// Number of entity records across categories.
    pub records: usize,
    /// Number of subscribers the payload was queued for.
    pub subscribers: usize,
    /// Serialized payload size in bytes.
    pub payload_bytes: usize,
}

/// Owns the pipeline state for one publisher lifetime.
pub struct Publisher {
    chat: ChatLog,
    cache: Arc<SnapshotCache>,
    sink: Arc<dyn SnapshotSink>,
    latest_scan: Option<ScanOutput>,
    ticks: u64,
    stopped: bool,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("chat", &self.chat.len())
            .field("ticks", &self.ticks)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    /// Create a publisher writing to `cache` and fanning out via `sink`.
    pub fn new(cache: Arc<SnapshotCache>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            chat: ChatLog::new(),
            cache,
            sink,
            latest_scan: None,
            ticks: 0,
            stopped: false,
        }
    }

    /// A publisher with its own cache and no subscribers.
    pub fn detached() -> Self {
        Self::new(Arc::new(SnapshotCache::new()), Arc::new(NoOpSink))
    }

    /// The shared cache this publisher writes.
    pub const fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Run the full pipeline for one tick.
    ///
    /// On a scan failure the cache is left untouched, nothing is pushed
    /// and the overlay's latest scan is cleared.
    pub fn on_tick(
        &mut self,
        world: &dyn WorldView,
        now: DateTime<Utc>,
    ) -> Result<TickSummary, TickError> {
        if self.stopped {
            return Err(TickError::Stopped);
        }
        self.ticks = self.ticks.saturating_add(1);

        let scan = match scanner::scan(world) {
            Ok(scan) => scan,
            Err(e) => {
                self.latest_scan = None;
                return Err(e.into());
            }
        };
        let records = scan.len();
        self.latest_scan = Some(scan.clone());

        let snapshot = assembler::assemble(world, scan, &self.chat, now);
        let payload = assembler::serialize(&snapshot)?;
        let payload_bytes = payload.len();

        self.cache.update(Arc::clone(&payload));
        let subscribers = self.sink.publish(&payload);

        debug!(
            tick = self.ticks,
            records,
            subscribers,
            payload_bytes,
            "snapshot published"
        );

        Ok(TickSummary {
            tick: self.ticks,
            records,
            subscribers,
            payload_bytes,
        })
    }

    /// Record one chat message. Ignored after shutdown.
    pub fn on_chat_message(&mut self, sender: Option<&str>, message: &str) {
        if self.stopped {
            return;
        }
        self.chat.record(sender, message);
    }

    /// The most recent successful scan, for the overlay's render pass.
    pub const fn latest_scan(&self) -> Option<&ScanOutput> {
        self.latest_scan.as_ref()
    }

    /// The chat ring.
    pub const fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Number of ticks attempted.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Stop the publisher: drop the chat ring and the latest scan. The
    /// cache keeps its last value.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.chat.clear();
        self.latest_scan = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::scene::SceneModel;
    use crate::world::GridSize;
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingSink {
        payloads: Mutex<Vec<Payload>>,
    }

    impl SnapshotSink for RecordingSink {
        fn publish(&self, payload: &Payload) -> usize {
            let mut guard = self.payloads.lock().unwrap();
            guard.push(Arc::clone(payload));
            1
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_600).unwrap()
    }

    fn scene() -> SceneModel {
        let mut scene = SceneModel::new(GridSize::square(10), 3200, 3200, 0);
        scene.spawn_player(5, 5);
        scene.place_object(1, 1, 10829);
        scene
    }

    fn publisher_with_sink() -> (Publisher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(Arc::new(SnapshotCache::new()), sink.clone());
        (publisher, sink)
    }

    #[test]
    fn tick_updates_cache_and_pushes_the_same_payload() {
        let (mut publisher, sink) = publisher_with_sink();
        let summary = publisher.on_tick(&scene(), now()).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.records, 1);
        assert_eq!(summary.subscribers, 1);

        let cached = publisher.cache().read();
        let pushed = sink.payloads.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert!(Arc::ptr_eq(&cached, pushed.first().unwrap()));
        assert!(cached.contains("\"tree_count\":1"));
    }

    #[test]
    fn absent_player_leaves_cache_unchanged_and_pushes_nothing() {
        let (mut publisher, sink) = publisher_with_sink();
        let mut world = scene();
        publisher.on_tick(&world, now()).unwrap();
        let before = publisher.cache().read();

        world.despawn_player();
        let err = publisher.on_tick(&world, now()).unwrap_err();
        assert!(err.is_skip());
        assert!(Arc::ptr_eq(&before, &publisher.cache().read()));
        assert_eq!(sink.payloads.lock().unwrap().len(), 1);
        assert!(publisher.latest_scan().is_none());
    }

    #[test]
    fn cache_stays_empty_until_first_successful_tick() {
        let mut publisher = Publisher::detached();
        let mut world = scene();
        world.despawn_player();
        assert!(publisher.on_tick(&world, now()).is_err());
        assert_eq!(&*publisher.cache().read(), "{}");
        assert!(!publisher.cache().has_snapshot());
    }

    #[test]
    fn chat_reaches_the_next_snapshot() {
        let mut publisher = Publisher::detached();
        publisher.on_chat_message(None, "You get some willow logs.");
        publisher.on_tick(&scene(), now()).unwrap();
        let payload = publisher.cache().read();
        assert!(payload.contains("[System] You get some willow logs."));
    }

    #[test]
    fn latest_scan_is_kept_for_the_overlay() {
        let mut publisher = Publisher::detached();
        publisher.on_tick(&scene(), now()).unwrap();
        let scan = publisher.latest_scan().unwrap();
        assert_eq!(scan.len(), 1);
    }

    #[test]
    fn shutdown_stops_ticks_and_clears_chat() {
        let mut publisher = Publisher::detached();
        publisher.on_chat_message(Some("Bob"), "hi");
        publisher.on_tick(&scene(), now()).unwrap();
        publisher.shutdown();
        assert!(publisher.chat().is_empty());
        assert!(matches!(
            publisher.on_tick(&scene(), now()),
            Err(TickError::Stopped)
        ));
        publisher.on_chat_message(None, "ignored");
        assert!(publisher.chat().is_empty());
        assert!(publisher.cache().has_snapshot());
    }

    #[test]
    fn noop_sink_reports_no_subscribers() {
        let mut publisher = Publisher::detached();
        let summary = publisher.on_tick(&scene(), now()).unwrap();
        assert_eq!(summary.subscribers, 0);
        assert_eq!(publisher.ticks(), 1);
    }
}
