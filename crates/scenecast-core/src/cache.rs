//! Last-known-good snapshot cache.
//!
//! Holds exactly one serialized snapshot behind a reference-counted
//! pointer. The tick pipeline is the single writer; subscriber handshakes
//! on the network side are the readers. An update swaps the pointer under
//! a write lock that is held for the swap only, and readers clone the
//! pointer under a read lock, so no reader ever sees a partial payload
//! and no lock is held across I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A serialized snapshot, shared without copying between the cache, the
/// broadcast queue and every connection.
pub type Payload = Arc<str>;

/// Payload served before the first successful tick.
pub const EMPTY_PAYLOAD: &str = "{}";

/// Single-slot cache of the most recent serialized snapshot.
#[derive(Debug)]
pub struct SnapshotCache {
    current: RwLock<Payload>,
    updates: AtomicU64,
}

impl SnapshotCache {
    /// A cache holding [`EMPTY_PAYLOAD`].
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::from(EMPTY_PAYLOAD)),
            updates: AtomicU64::new(0),
        }
    }

    /// Replace the held payload.
    pub fn update(&self, payload: Payload) {
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, payload)
        };
        self.updates.fetch_add(1, Ordering::AcqRel);
        // Freed outside the lock.
        drop(previous);
    }

    /// The most recently stored payload, or [`EMPTY_PAYLOAD`] before the
    /// first update.
    pub fn read(&self) -> Payload {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Number of updates applied so far.
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Acquire)
    }

    /// True once at least one snapshot has been stored.
    pub fn has_snapshot(&self) -> bool {
        self.update_count() > 0
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
