//! Registry of active subscriber connections.
//!
//! Each WebSocket task registers itself on upgrade and drives its own
//! entry through `Connecting -> Open -> Closed`. Closing removes the entry,
//! so the registry only ever lists live connections. The lock is a plain
//! `std` lock held for map operations only, never across an `await`.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use scenecast_types::{CloseReason, ConnectionId, ConnectionInfo, ConnectionState};
use tracing::debug;

/// Errors from an illegal or unknown lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// No connection with this id is registered (already closed).
    #[error("unknown connection {0}")]
    Unknown(ConnectionId),

    /// The state machine does not allow this move.
    #[error("connection {id}: illegal transition {from:?} -> {to:?}")]
    Illegal {
        /// The connection.
        id: ConnectionId,
        /// Current state.
        from: ConnectionState,
        /// Requested state.
        to: ConnectionState,
    },
}

/// The set of live subscriber connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: RwLock<BTreeMap<ConnectionId, ConnectionInfo>>,
}

impl ConnectionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection in `Connecting`.
    pub fn register(&self) -> ConnectionId {
        let id = ConnectionId::new();
        let info = ConnectionInfo {
            id,
            state: ConnectionState::Connecting,
            connected_at: Utc::now(),
            messages_sent: 0,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, info);
        id
    }

    /// Move a connection to `Open`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the connection is unknown or not in
    /// `Connecting`.
    pub fn open(&self, id: ConnectionId) -> Result<(), TransitionError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let info = entries.get_mut(&id).ok_or(TransitionError::Unknown(id))?;
        if !info.state.can_transition_to(ConnectionState::Open) {
            return Err(TransitionError::Illegal {
                id,
                from: info.state,
                to: ConnectionState::Open,
            });
        }
        info.state = ConnectionState::Open;
        Ok(())
    }

    /// Close a connection and drop it from the active set.
    ///
    /// Returns `false` if it was already gone.
    pub fn close(&self, id: ConnectionId, reason: CloseReason) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(info) => {
                debug!(
                    connection = %id,
                    ?reason,
                    from = ?info.state,
                    messages_sent = info.messages_sent,
                    "connection closed"
                );
                true
            }
            None => false,
        }
    }

    /// Close every connection. Returns how many were closed.
    pub fn close_all(&self, reason: CloseReason) -> usize {
        let drained = std::mem::take(
            &mut *self.entries.write().unwrap_or_else(PoisonError::into_inner),
        );
        if !drained.is_empty() {
            debug!(count = drained.len(), ?reason, "all connections closed");
        }
        drained.len()
    }

    /// Count one delivered payload.
    pub fn record_sent(&self, id: ConnectionId) {
        if let Some(info) = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
        {
            info.messages_sent = info.messages_sent.saturating_add(1);
        }
    }

    /// Current state of a connection; `None` once closed.
    pub fn state(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|info| info.state)
    }

    /// Whether a connection is still registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.state(id).is_some()
    }

    /// Number of connections in `Open`.
    pub fn open_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|info| info.state == ConnectionState::Open)
            .count()
    }

    /// Number of registered connections in any state.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of every entry, oldest first.
    pub fn list(&self) -> Vec<ConnectionInfo> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn connecting_then_open_then_closed() {
        let registry = ConnectionRegistry::new();
        let id = registry.register();
        assert_eq!(registry.state(id), Some(ConnectionState::Connecting));
        assert_eq!(registry.open_count(), 0);

        registry.open(id).unwrap();
        assert_eq!(registry.state(id), Some(ConnectionState::Open));
        assert_eq!(registry.open_count(), 1);

        assert!(registry.close(id, CloseReason::PeerDisconnect));
        assert_eq!(registry.state(id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn closed_connections_cannot_reopen() {
        let registry = ConnectionRegistry::new();
        let id = registry.register();
        assert!(registry.close(id, CloseReason::TransportError));
        assert_eq!(registry.open(id), Err(TransitionError::Unknown(id)));
        assert!(!registry.close(id, CloseReason::TransportError));
    }

    #[test]
    fn open_twice_is_illegal() {
        let registry = ConnectionRegistry::new();
        let id = registry.register();
        registry.open(id).unwrap();
        assert!(matches!(
            registry.open(id),
            Err(TransitionError::Illegal {
                from: ConnectionState::Open,
                ..
            })
        ));
    }

    #[test]
    fn close_all_empties_the_set() {
        let registry = ConnectionRegistry::new();
        let a = registry.register();
        let b = registry.register();
        registry.open(a).unwrap();
        assert_eq!(registry.close_all(CloseReason::Shutdown), 2);
        assert!(!registry.contains(a));
        assert!(!registry.contains(b));
    }

    #[test]
    fn counts_sent_messages() {
        let registry = ConnectionRegistry::new();
        let id = registry.register();
        registry.open(id).unwrap();
        registry.record_sent(id);
        registry.record_sent(id);
        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().map(|c| c.messages_sent), Some(2));
    }
}
