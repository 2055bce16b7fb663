//! Configuration management
//!
//! Loads configuration from config.toml at startup. Every field has a serde
//! default so a missing file or a partial file both work.

use serde::{Deserialize, Serialize};

/// Client configuration
///
/// Loaded from config.toml at startup; the path is overridable through the
/// CONFIG_PATH environment variable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// WebSocket stream settings
    #[serde(default)]
    pub ws: WsConfig,

    /// REST snapshot settings
    #[serde(default)]
    pub rest: RestConfig,
}

/// WebSocket stream configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WsConfig {
    /// Single-stream base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Combined-stream base URL
    #[serde(default = "default_combined_base_url")]
    pub combined_base_url: String,

    /// Forced reconnect interval in seconds, bounding socket lifetime
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Initial dial timeout in seconds
    #[serde(default = "default_dial_timeout_secs")]
    pub dial_timeout_secs: u64,

    /// Initial reconnect backoff delay in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Reconnect backoff cap in seconds
    #[serde(default = "default_max_reconnect_delay_secs")]
    pub max_reconnect_delay_secs: u64,
}

/// REST snapshot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestConfig {
    /// REST API base URL
    #[serde(default = "default_rest_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_rest_timeout_secs")]
    pub timeout_secs: u64,

    /// Restrict the snapshot to symbols quoted in this asset
    #[serde(default)]
    pub quote_filter: Option<String>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            combined_base_url: default_combined_base_url(),
            refresh_secs: default_refresh_secs(),
            dial_timeout_secs: default_dial_timeout_secs(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_secs: default_max_reconnect_delay_secs(),
        }
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_rest_base_url(),
            timeout_secs: default_rest_timeout_secs(),
            quote_filter: None,
        }
    }
}

fn default_base_url() -> String {
    "wss://stream.binance.com:9443/ws".to_string()
}

fn default_combined_base_url() -> String {
    "wss://stream.binance.com:9443/stream?streams=".to_string()
}

fn default_refresh_secs() -> u64 {
    86_400 // one day
}

fn default_dial_timeout_secs() -> u64 {
    10
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

fn default_max_reconnect_delay_secs() -> u64 {
    60
}

fn default_rest_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_rest_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from config.toml
    ///
    /// A missing file yields the defaults.
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(e.to_string()))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ws.base_url, "wss://stream.binance.com:9443/ws");
        assert_eq!(
            config.ws.combined_base_url,
            "wss://stream.binance.com:9443/stream?streams="
        );
        assert_eq!(config.ws.refresh_secs, 86_400);
        assert_eq!(config.ws.dial_timeout_secs, 10);
        assert_eq!(config.rest.base_url, "https://api.binance.com");
        assert!(config.rest.quote_filter.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [ws]
            base_url = "ws://127.0.0.1:9000/ws"
            refresh_secs = 3600

            [rest]
            quote_filter = "USDT"
            "#,
        )
        .unwrap();
        assert_eq!(config.ws.base_url, "ws://127.0.0.1:9000/ws");
        assert_eq!(config.ws.refresh_secs, 3_600);
        // untouched fields keep their defaults
        assert_eq!(config.ws.dial_timeout_secs, 10);
        assert_eq!(config.rest.quote_filter.as_deref(), Some("USDT"));
    }

    #[test]
    fn test_empty_toml_is_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ws.refresh_secs, 86_400);
        assert_eq!(config.rest.timeout_secs, 10);
    }
}
