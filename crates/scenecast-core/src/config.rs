//! Configuration loading and typed config structures for Scenecast.
//!
//! The configuration lives in `scenecast.yaml` next to the binary. Every
//! field has a default, so an empty or partial file is valid. A handful of
//! environment variables override the network settings for deployment.

use std::path::Path;

use serde::Deserialize;

use crate::overlay::Rgb;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `scenecast.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScenecastConfig {
    /// Broadcast endpoint settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Overlay colors and toggles.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Tick loop settings.
    #[serde(default)]
    pub tick: TickConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScenecastConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SCENECAST_HOST` overrides `network.host`
    /// - `SCENECAST_PORT` overrides `network.port`
    /// - `SCENECAST_NETWORK_ENABLED` overrides `network.enabled`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.network.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field and range constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick.interval_ms",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.network.outbound_queue == 0 {
            return Err(ConfigError::Invalid {
                field: "network.outbound_queue",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.network.send_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "network.send_timeout_ms",
                reason: "must be greater than zero".to_owned(),
            });
        }
        // Subscribers only ever answer pings, so pongs are the sole
        // inbound traffic that keeps a reading peer alive.
        let idle = self.network.idle_timeout_secs;
        let ping = self.network.ping_interval_secs;
        if idle > 0 && (ping == 0 || ping >= idle) {
            return Err(ConfigError::Invalid {
                field: "network.ping_interval_secs",
                reason: format!(
                    "must be between 1 and {} while idle_timeout_secs is {idle}",
                    idle.saturating_sub(1)
                ),
            });
        }
        Ok(())
    }
}

/// Broadcast endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Whether the WebSocket endpoint is started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds without an inbound frame before a connection is closed.
    /// Zero disables the idle timeout.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Seconds between keep-alive pings. Zero disables pings.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Milliseconds a single send may take before the connection is
    /// closed.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Per-subscriber queue depth; the oldest payload is dropped when a
    /// subscriber falls this far behind.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl NetworkConfig {
    /// Override network settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to a value
    /// that does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparseable values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SCENECAST_HOST") {
            self.host = val;
        }
        if let Some(val) = lookup("SCENECAST_PORT") {
            self.port = val.trim().parse().map_err(|e| ConfigError::Invalid {
                field: "network.port",
                reason: format!("SCENECAST_PORT={val}: {e}"),
            })?;
        }
        if let Some(val) = lookup("SCENECAST_NETWORK_ENABLED") {
            self.enabled = parse_flag(&val).ok_or_else(|| ConfigError::Invalid {
                field: "network.enabled",
                reason: format!("SCENECAST_NETWORK_ENABLED={val}: expected true or false"),
            })?;
        }
        Ok(())
    }

    /// `host:port` as one string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
            idle_timeout_secs: default_idle_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            send_timeout_ms: default_send_timeout_ms(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

/// Overlay colors and toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OverlayConfig {
    /// Draw `"<n> tiles"` labels.
    #[serde(default = "default_true")]
    pub show_distance: bool,

    /// Tree outline and label color.
    #[serde(default = "default_tree_color")]
    pub tree_color: Rgb,

    /// Bank outline and label color.
    #[serde(default = "default_bank_color")]
    pub bank_color: Rgb,

    /// Color for ore veins, hoppers, sacks and struts.
    #[serde(default = "default_mining_color")]
    pub mining_color: Rgb,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_distance: default_true(),
            tree_color: default_tree_color(),
            bank_color: default_bank_color(),
            mining_color: default_mining_color(),
        }
    }
}

/// Tick loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TickConfig {
    /// Milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    8765
}

const fn default_idle_timeout_secs() -> u64 {
    60
}

const fn default_ping_interval_secs() -> u64 {
    15
}

const fn default_send_timeout_ms() -> u64 {
    2000
}

const fn default_outbound_queue() -> usize {
    16
}

const fn default_tree_color() -> Rgb {
    Rgb::GREEN
}

const fn default_bank_color() -> Rgb {
    Rgb::YELLOW
}

const fn default_mining_color() -> Rgb {
    Rgb::CYAN
}

const fn default_tick_interval_ms() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = ScenecastConfig::default();
        assert!(config.network.enabled);
        assert_eq!(config.network.bind_address(), "127.0.0.1:8765");
        assert_eq!(config.network.outbound_queue, 16);
        assert!(config.overlay.show_distance);
        assert_eq!(config.overlay.tree_color, Rgb::GREEN);
        assert_eq!(config.overlay.bank_color, Rgb::YELLOW);
        assert_eq!(config.tick.interval_ms, 600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config = ScenecastConfig::parse("{}").unwrap();
        assert_eq!(config, ScenecastConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r##"
network:
  enabled: false
  host: "0.0.0.0"
  port: 9000
  idle_timeout_secs: 30
  ping_interval_secs: 5
  send_timeout_ms: 500
  outbound_queue: 4
overlay:
  show_distance: false
  tree_color: "#112233"
  bank_color: "#AABBCC"
  mining_color: "#000000"
tick:
  interval_ms: 100
  max_ticks: 50
logging:
  level: debug
"##;
        let config = ScenecastConfig::parse(yaml).unwrap();
        assert!(!config.network.enabled);
        assert_eq!(config.network.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.network.outbound_queue, 4);
        assert_eq!(config.overlay.tree_color, Rgb::new(0x11, 0x22, 0x33));
        assert!(!config.overlay.show_distance);
        assert_eq!(config.tick.max_ticks, 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let config = ScenecastConfig::parse(include_str!("../../../scenecast.yaml")).unwrap();
        assert_eq!(config, ScenecastConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ScenecastConfig::parse("network:\n  port: 9999\n").unwrap();
        assert_eq!(config.network.port, 9999);
        assert_eq!(config.network.host, "127.0.0.1");
        assert_eq!(config.network.ping_interval_secs, 15);
    }

    #[test]
    fn bad_color_is_a_yaml_error() {
        let err = ScenecastConfig::parse("overlay:\n  tree_color: green\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = ScenecastConfig::parse("tick:\n  interval_ms: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "tick.interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn idle_timeout_requires_a_shorter_ping() {
        for yaml in [
            "network:\n  idle_timeout_secs: 60\n  ping_interval_secs: 0\n",
            "network:\n  idle_timeout_secs: 60\n  ping_interval_secs: 60\n",
            "network:\n  idle_timeout_secs: 60\n  ping_interval_secs: 120\n",
        ] {
            let err = ScenecastConfig::parse(yaml).unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigError::Invalid {
                        field: "network.ping_interval_secs",
                        ..
                    }
                ),
                "{yaml}"
            );
        }
    }

    #[test]
    fn pings_may_be_off_without_an_idle_timeout() {
        let config =
            ScenecastConfig::parse("network:\n  idle_timeout_secs: 0\n  ping_interval_secs: 0\n")
                .unwrap();
        assert_eq!(config.network.idle_timeout_secs, 0);
        assert_eq!(config.network.ping_interval_secs, 0);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: BTreeMap<&str, &str> = [
            ("SCENECAST_HOST", "0.0.0.0"),
            ("SCENECAST_PORT", "7000"),
            ("SCENECAST_NETWORK_ENABLED", "off"),
        ]
        .into_iter()
        .collect();
        let mut network = NetworkConfig::default();
        network
            .apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(network.bind_address(), "0.0.0.0:7000");
        assert!(!network.enabled);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut network = NetworkConfig::default();
        let err = network
            .apply_overrides(|key| (key == "SCENECAST_PORT").then(|| "http".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "network.port", .. }));
        assert_eq!(network.port, 8765);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ScenecastConfig::from_file(Path::new("/nonexistent/scenecast.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
