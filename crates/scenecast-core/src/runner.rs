//! Tick loop runner with operator stop.
//!
//! [`run_ticks`] drives a [`Publisher`] at the configured cadence. Each
//! iteration advances the world through a [`TickDriver`], feeds any chat
//! lines the tick produced, then runs the synchronous pipeline. Skipped
//! ticks (no local player) are logged and the loop carries on; the loop
//! ends on the tick limit or an operator stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::TickConfig;
use crate::tick::{Publisher, TickError, TickSummary};
use crate::world::WorldView;

/// One chat message produced by the host during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Sender name; `None` for game messages.
    pub sender: Option<String>,
    /// Message body.
    pub message: String,
}

impl ChatLine {
    /// A game (system) message.
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            sender: None,
            message: message.into(),
        }
    }
}

/// Source of world state for the tick loop.
pub trait TickDriver: Send {
    /// Advance the world by one host tick and return the chat lines it
    /// produced.
    fn advance(&mut self, tick: u64) -> Vec<ChatLine>;

    /// Read-only view of the world after the last advance.
    fn world(&self) -> &dyn WorldView;
}

/// Callback invoked after each published tick.
pub trait TickCallback: Send {
    /// Called with the summary and the publisher that produced it.
    fn on_tick(&mut self, summary: &TickSummary, publisher: &Publisher);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _publisher: &Publisher) {}
}

/// Reason the tick loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Reached the configured `max_ticks`.
    MaxTicksReached,
    /// An operator requested a stop.
    OperatorStop,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Why the loop ended.
    pub end_reason: EndReason,
    /// Ticks attempted.
    pub total_ticks: u64,
    /// Ticks that published a snapshot.
    pub published: u64,
    /// Ticks skipped for lack of a local player.
    pub skipped: u64,
    /// Summary of the last published tick.
    pub last_summary: Option<TickSummary>,
}

/// Shared stop flag for the tick loop.
#[derive(Debug, Default)]
pub struct RunControl {
    stop_requested: AtomicBool,
    stop_notify: Notify,
}

impl RunControl {
    /// A control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean stop and wake the loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    pub async fn stopped(&self) {
        loop {
            let notified = self.stop_notify.notified();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }
}

const fn tick_limit_reached(max_ticks: u64, tick: u64) -> bool {
    max_ticks > 0 && tick >= max_ticks
}

/// Run the tick loop until the tick limit or an operator stop.
pub async fn run_ticks(
    publisher: &mut Publisher,
    driver: &mut dyn TickDriver,
    control: &RunControl,
    config: &TickConfig,
    callback: &mut dyn TickCallback,
) -> RunResult {
    let mut interval = tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut result = RunResult {
        end_reason: EndReason::OperatorStop,
        total_ticks: 0,
        published: 0,
        skipped: 0,
        last_summary: None,
    };

    info!(
        interval_ms = config.interval_ms,
        max_ticks = config.max_ticks,
        "tick loop starting"
    );

    loop {
        tokio::select! {
            biased;
            () = control.stopped() => {
                info!("operator stop requested");
                result.end_reason = EndReason::OperatorStop;
                break;
            }
            _ = interval.tick() => {}
        }

        let tick = result.total_ticks.saturating_add(1);
        result.total_ticks = tick;

        for line in driver.advance(tick) {
            publisher.on_chat_message(line.sender.as_deref(), &line.message);
        }

        match publisher.on_tick(driver.world(), Utc::now()) {
            Ok(summary) => {
                result.published = result.published.saturating_add(1);
                callback.on_tick(&summary, publisher);
                result.last_summary = Some(summary);
            }
            Err(e) if e.is_skip() => {
                result.skipped = result.skipped.saturating_add(1);
                debug!(tick, error = %e, "tick skipped");
            }
            Err(TickError::Stopped) => {
                result.end_reason = EndReason::OperatorStop;
                break;
            }
            Err(e) => {
                warn!(tick, error = %e, "tick failed; cache unchanged");
            }
        }

        if tick_limit_reached(config.max_ticks, tick) {
            info!(tick, max_ticks = config.max_ticks, "tick limit reached");
            result.end_reason = EndReason::MaxTicksReached;
            break;
        }
    }

    result
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        published = result.published,
        skipped = result.skipped,
        "tick loop ended"
    );
    if result.published == 0 {
        warn!("no snapshot was published during the run");
    }
}
