//! Scenecast publisher binary.
//!
//! Wires the tick pipeline, the demo scene driver and the embedded
//! broadcast server together, then runs the tick loop until the tick
//! limit or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `scenecast.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared snapshot cache
//! 4. Start the broadcast server (when enabled)
//! 5. Build the publisher and the demo scene
//! 6. Install the Ctrl-C handler
//! 7. Run the tick loop
//! 8. Shut down publisher and server, log the result

mod demo;
mod error;
mod overlay_callback;

use std::path::Path;
use std::sync::Arc;

use scenecast_core::cache::SnapshotCache;
use scenecast_core::config::{LoggingConfig, ScenecastConfig};
use scenecast_core::runner::{self, RunControl};
use scenecast_core::tick::{NoOpSink, Publisher, SnapshotSink};
use scenecast_observer::{AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::demo::DemoScene;
use crate::error::EngineError;
use crate::overlay_callback::OverlayCallback;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "scenecast.yaml";

/// Application entry point for the publisher.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the broadcast
/// server task fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("scenecast-engine starting");
    if !from_file {
        info!(path = CONFIG_FILE, "Config file not found, using defaults");
    }
    info!(
        network_enabled = config.network.enabled,
        bind = config.network.bind_address(),
        tick_interval_ms = config.tick.interval_ms,
        max_ticks = config.tick.max_ticks,
        "Configuration loaded"
    );

    // 3. Create the shared snapshot cache.
    let cache = Arc::new(SnapshotCache::new());

    // 4. Start the broadcast server. A bind failure leaves the publisher
    //    running without subscribers.
    let mut observer = None;
    let sink: Arc<dyn SnapshotSink> = if config.network.enabled {
        let app_state = Arc::new(AppState::from_config(Arc::clone(&cache), &config.network));
        let server_config = ServerConfig::from(&config.network);
        match scenecast_observer::spawn_observer(&server_config, Arc::clone(&app_state)).await {
            Ok(handle) => {
                info!(addr = %handle.local_addr, "Broadcast server started");
                observer = Some((app_state, handle));
            }
            Err(e) => {
                warn!(error = %e, "broadcast server unavailable, publishing to cache only");
            }
        }
        match &observer {
            Some((state, _)) => Arc::clone(state) as Arc<dyn SnapshotSink>,
            None => Arc::new(NoOpSink),
        }
    } else {
        info!("Network disabled, publishing to cache only");
        Arc::new(NoOpSink)
    };

    // 5. Build the publisher and the demo scene.
    let mut publisher = Publisher::new(Arc::clone(&cache), sink);
    let mut driver = DemoScene::new();
    let mut callback = OverlayCallback::new(config.overlay);

    // 6. Install the Ctrl-C handler.
    let control = Arc::new(RunControl::new());
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => control.request_stop(),
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 7. Run the tick loop.
    let result = runner::run_ticks(
        &mut publisher,
        &mut driver,
        &control,
        &config.tick,
        &mut callback,
    )
    .await;
    runner::log_run_end(&result);

    // 8. Shut down.
    publisher.shutdown();
    if let Some((state, handle)) = observer {
        state.shutdown();
        handle.task.await.map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        cache_updates = cache.update_count(),
        overlay_commands = callback.last_plan().len(),
        "scenecast-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `scenecast.yaml` in the working directory.
///
/// Returns the configuration and whether it came from the file. Without
/// a file, defaults are used and environment overrides still apply.
fn load_config() -> Result<(ScenecastConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((ScenecastConfig::from_file(config_path)?, true))
    } else {
        let mut config = ScenecastConfig::default();
        config.network.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level; an unparsable level falls
/// back to `info`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
