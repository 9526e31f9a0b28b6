//! Subscriber connection lifecycle types.
//!
//! A connection moves `Connecting -> Open -> Closed`, or straight from
//! `Connecting` to `Closed` when the handshake fails. `Closed` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ConnectionId;

/// Lifecycle state of a subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ConnectionState {
    /// Upgrade accepted, initial snapshot not yet sent.
    Connecting,
    /// Receiving pushed snapshots.
    Open,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Whether moving to `next` is a legal transition.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Open | Self::Closed) | (Self::Open, Self::Closed)
        )
    }

    /// True for [`ConnectionState::Closed`].
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Why a connection closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CloseReason {
    /// The peer sent a close frame or dropped the socket.
    PeerDisconnect,
    /// The publisher was stopped.
    Shutdown,
    /// No inbound frame within the idle timeout.
    IdleTimeout,
    /// A send did not complete within the send timeout.
    SendTimeout,
    /// A transport error on this connection.
    TransportError,
    /// The broadcast source went away.
    SourceClosed,
}

/// Public view of one connection, served by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConnectionInfo {
    /// Connection identifier.
    pub id: ConnectionId,
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// When the upgrade was accepted.
    pub connected_at: DateTime<Utc>,
    /// Payloads delivered so far, including the initial snapshot.
    pub messages_sent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use ConnectionState::{Closed, Connecting, Open};
        assert!(Connecting.can_transition_to(Open));
        assert!(Connecting.can_transition_to(Closed));
        assert!(Open.can_transition_to(Closed));
    }

    #[test]
    fn closed_is_terminal() {
        use ConnectionState::{Closed, Connecting, Open};
        assert!(Closed.is_terminal());
        for next in [Connecting, Open, Closed] {
            assert!(!Closed.can_transition_to(next));
        }
        assert!(!Open.can_transition_to(Connecting));
        assert!(!Open.can_transition_to(Open));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&CloseReason::IdleTimeout).unwrap_or_default();
        assert_eq!(json, "\"idle_timeout\"");
    }
}
