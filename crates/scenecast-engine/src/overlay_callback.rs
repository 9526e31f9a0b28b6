//! Tick callback that plans the overlay for the latest scan.
//!
//! No renderer is attached to the engine, so the planned draw commands
//! are only counted and logged. A host adapter would hand them to its
//! canvas instead.

use scenecast_core::config::OverlayConfig;
use scenecast_core::overlay::{DrawCommand, plan_overlay};
use scenecast_core::runner::TickCallback;
use scenecast_core::tick::{Publisher, TickSummary};
use tracing::debug;

/// Callback that plans outlines and distance labels after each tick.
pub struct OverlayCallback {
    config: OverlayConfig,
    last_plan: Vec<DrawCommand>,
}

impl OverlayCallback {
    /// Create a callback using the given overlay settings.
    pub const fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            last_plan: Vec::new(),
        }
    }

    /// Draw commands planned for the most recent tick.
    pub fn last_plan(&self) -> &[DrawCommand] {
        &self.last_plan
    }
}

impl TickCallback for OverlayCallback {
    fn on_tick(&mut self, summary: &TickSummary, publisher: &Publisher) {
        self.last_plan = publisher
            .latest_scan()
            .map(|scan| plan_overlay(scan, &self.config))
            .unwrap_or_default();

        let labels = self
            .last_plan
            .iter()
            .filter(|command| matches!(command, DrawCommand::Label { .. }))
            .count();
        debug!(
            tick = summary.tick,
            outlines = self.last_plan.len().saturating_sub(labels),
            labels,
            subscribers = summary.subscribers,
            "Overlay planned"
        );
    }
}
