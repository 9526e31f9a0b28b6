//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure that can abort startup or shutdown.
//! A bind failure of the broadcast server is not among them: the engine
//! logs it and keeps publishing to the cache.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: scenecast_core::config::ConfigError,
    },

    /// The broadcast server task panicked or was cancelled.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
