//! `WebSocket` handler for snapshot streaming.
//!
//! Clients connect to `GET /ws`. The handler subscribes to the broadcast
//! before reading the cache, sends the cached payload as the first frame,
//! then forwards every pushed payload verbatim. Inbound text and binary
//! frames are logged and ignored.
//!
//! A connection closes on peer disconnect, server shutdown, idle timeout
//! or a send that exceeds the send timeout. Errors close only the
//! connection they occur on.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use scenecast_types::{CloseReason, ConnectionId};
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::state::{AppState, frame_text};

/// Upgrade an HTTP request to a `WebSocket` subscriber.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_snapshots(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection from `Connecting` to `Closed`.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let id = state.connections.register();
    debug!(connection = %id, "subscriber connecting");

    // Subscribe before reading the cache: a tick landing in between is
    // then delivered twice rather than lost.
    let mut rx = state.subscribe();
    let mut shutdown = state.shutdown_signal();

    let reason = if *shutdown.borrow_and_update() {
        CloseReason::Shutdown
    } else {
        match state.connections.open(id) {
            Ok(()) => run_open(&mut socket, &state, id, &mut rx, &mut shutdown).await,
            Err(e) => {
                debug!(connection = %id, error = %e, "connection closed before open");
                CloseReason::Shutdown
            }
        }
    };

    if matches!(reason, CloseReason::Shutdown | CloseReason::IdleTimeout) {
        let sent =
            send_with_timeout(&mut socket, Message::Close(None), state.settings.send_timeout).await;
        if let Err(close_failure) = sent {
            debug!(connection = %id, ?reason, ?close_failure, "close frame not delivered");
        }
    }
    state.connections.close(id, reason);
}

/// The `Open` phase: initial snapshot, then the forwarding loop.
async fn run_open(
    socket: &mut WebSocket,
    state: &AppState,
    id: ConnectionId,
    rx: &mut broadcast::Receiver<Utf8Bytes>,
    shutdown: &mut watch::Receiver<bool>,
) -> CloseReason {
    let settings = state.settings;

    let initial = frame_text(&state.cache.read());
    let bytes = initial.as_str().len();
    if let Err(reason) = send_text(socket, initial, settings.send_timeout).await {
        return reason;
    }
    state.connections.record_sent(id);
    debug!(connection = %id, bytes, "initial snapshot sent");

    let mut ping = settings.ping_interval.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First ping one period from now, not immediately.
        interval.reset();
        interval
    });
    let mut idle_deadline = next_deadline(settings.idle_timeout);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return CloseReason::Shutdown;
                }
            }
            result = rx.recv() => {
                match result {
                    Ok(text) => {
                        if let Err(reason) = send_text(socket, text, settings.send_timeout).await {
                            return reason;
                        }
                        state.connections.record_sent(id);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(connection = %id, skipped = n, "subscriber lagged, dropped oldest");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return CloseReason::SourceClosed;
                    }
                }
            }
            msg = socket.recv() => {
                idle_deadline = next_deadline(settings.idle_timeout);
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        return CloseReason::PeerDisconnect;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(reason) =
                            send_with_timeout(socket, Message::Pong(data), settings.send_timeout).await
                        {
                            return reason;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Text(text))) => {
                        debug!(connection = %id, len = text.as_str().len(), "ignoring inbound text");
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!(connection = %id, len = data.len(), "ignoring inbound binary");
                    }
                    Some(Err(e)) => {
                        debug!(connection = %id, error = %e, "websocket error");
                        return CloseReason::TransportError;
                    }
                }
            }
            () = next_ping(ping.as_mut()) => {
                if let Err(reason) =
                    send_with_timeout(socket, Message::Ping(Bytes::new()), settings.send_timeout).await
                {
                    return reason;
                }
            }
            () = idle_expired(idle_deadline) => {
                debug!(connection = %id, "idle timeout");
                return CloseReason::IdleTimeout;
            }
        }
    }
}

async fn send_text(
    socket: &mut WebSocket,
    text: Utf8Bytes,
    limit: Duration,
) -> Result<(), CloseReason> {
    send_with_timeout(socket, Message::Text(text), limit).await
}

async fn send_with_timeout(
    socket: &mut WebSocket,
    msg: Message,
    limit: Duration,
) -> Result<(), CloseReason> {
    match tokio::time::timeout(limit, socket.send(msg)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            debug!(error = %e, "send failed");
            Err(CloseReason::PeerDisconnect)
        }
        Err(_elapsed) => {
            warn!(timeout = ?limit, "send timed out, closing stalled subscriber");
            Err(CloseReason::SendTimeout)
        }
    }
}

fn next_deadline(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

async fn next_ping(ping: Option<&mut Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn idle_expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
