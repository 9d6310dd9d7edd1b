//! # Gateway Configuration
//!
//! Configuration for the backend gateway client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Priority                          │
//! │                                                                     │
//! │  1. Environment Variables (highest priority)                        │
//! │     VENTA_BACKEND_URL=https://api.example.com                       │
//! │     VENTA_TIMEOUT_SECS=10                                           │
//! │                                                                     │
//! │  2. TOML Config File                                                │
//! │     ~/.config/venta/gateway.toml (Linux)                            │
//! │                                                                     │
//! │  3. Default Values (lowest priority)                                │
//! │     http://localhost:4000, 30s timeout                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # gateway.toml
//! base_url = "https://backend.example.com"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Backend gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (gateway.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> GatewayResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading gateway config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| GatewayError::Config(e.to_string()))?;
                config = toml::from_str(&contents)
                    .map_err(|e| GatewayError::Config(e.to_string()))?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load gateway config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::Config("base_url must not be empty".into()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base_url: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::Config(format!(
                "base_url must be http(s), got scheme '{}'",
                url.scheme()
            )));
        }

        if self.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("VENTA_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.base_url = url;
        }

        if let Ok(timeout) = std::env::var("VENTA_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.timeout_secs = secs;
            }
        }

        if let Ok(timeout) = std::env::var("VENTA_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.connect_timeout_secs = secs;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "venta", "admin")
            .map(|dirs| dirs.config_dir().join("gateway.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = GatewayConfig::default();

        config.base_url = String::new();
        assert!(config.validate().is_err());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://backend.example.com".to_string();
        assert!(config.validate().is_ok());

        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GatewayConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("base_url"));

        let parsed: GatewayConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.base_url, config.base_url);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: GatewayConfig =
            toml::from_str("base_url = \"https://api.example.com\"").unwrap();
        assert_eq!(parsed.base_url, "https://api.example.com");
        assert_eq!(parsed.timeout_secs, 30);
    }
}
