//! Application configuration.
//!
//! YAML-based configuration loading and validation for:
//! - Server settings (bind address, port)
//! - Database settings (SQLite path)
//! - Probe settings (batch policy and cycle interval)

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::SamplePolicy;
use crate::scheduler::DEFAULT_CYCLE_INTERVAL;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file path.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "hostwatch.db".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Build the sqlx connection URL for this database.
    pub fn connection_url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

fn default_cycle_interval() -> Duration {
    DEFAULT_CYCLE_INTERVAL
}

/// Probing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-host batch policy (attempts, per-attempt timeout, delay).
    #[serde(flatten)]
    pub policy: SamplePolicy,

    /// Pause between cycles, end-of-cycle to start-of-next (default: 300s).
    #[serde(default = "default_cycle_interval", with = "humantime_serde")]
    pub cycle_interval: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            policy: SamplePolicy::default(),
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web server configuration.
    pub server: ServerConfig,

    /// Database configuration.
    pub database: DatabaseConfig,

    /// Probing configuration.
    pub probe: ProbeConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, or fall back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::Validation(format!("invalid server bind address: '{}'", self.server.bind))
        })?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server port must be non-zero".to_string(),
            ));
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database path must not be empty".to_string(),
            ));
        }

        if self.probe.policy.attempts == 0 {
            return Err(ConfigError::Validation(
                "probe attempts must be positive".to_string(),
            ));
        }

        if self.probe.policy.probe_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "probe timeout must be positive".to_string(),
            ));
        }

        if self.probe.cycle_interval.is_zero() {
            return Err(ConfigError::Validation(
                "probe cycle_interval must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
