//! Configuration management for SafeWatch.
//!
//! Configuration is read from TOML. Every section and field has a default, so
//! an empty file is a valid configuration:
//!
//! ```toml
//! [proximity]
//! alert_radius_km = 5.0
//! community_radius_km = 10.0
//! post_radius_km = 5.0
//! post_limit = 50
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proximity: ProximityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default search radii for the nearby lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Radius for active SOS alerts
    pub alert_radius_km: f64,
    /// Radius for communities
    pub community_radius_km: f64,
    /// Radius for community posts
    pub post_radius_km: f64,
    /// Maximum number of posts returned
    pub post_limit: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            alert_radius_km: 5.0,
            community_radius_km: 10.0,
            post_radius_km: 5.0,
            post_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reject radii that the proximity engine would refuse at query time
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radii = [
            ("alert_radius_km", self.proximity.alert_radius_km),
            ("community_radius_km", self.proximity.community_radius_km),
            ("post_radius_km", self.proximity.post_radius_km),
        ];

        for (name, value) in radii {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "proximity.{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.proximity.post_limit == 0 {
            return Err(ConfigError::Invalid(
                "proximity.post_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
