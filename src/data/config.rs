//! Application Configuration
//!
//! Handles loading and saving application configuration and resolves the
//! per-user data directory every persisted file lives in.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PersistenceError;

const APP_DIR_NAME: &str = "SlotRelay";

/// Port of the desktop bridge listener
pub const DESKTOP_PORT: u16 = 8000;
/// Port of the mobile pairing listener
pub const MOBILE_PORT: u16 = 8001;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Per-user application data directory, created if missing
    pub fn data_dir() -> Result<PathBuf, PersistenceError> {
        let dir = dirs::data_dir()
            .ok_or(PersistenceError::NoDataDir)?
            .join(APP_DIR_NAME);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, PersistenceError> {
        Ok(Self::data_dir()?.join("config.toml"))
    }

    /// Get the encrypted slot store path
    pub fn store_path() -> Result<PathBuf, PersistenceError> {
        Ok(Self::data_dir()?.join("slots.dat"))
    }

    /// Get the debug log path
    pub fn log_path() -> Result<PathBuf, PersistenceError> {
        Ok(Self::data_dir()?.join("debug.log"))
    }

    /// Load configuration from file or create default
    pub fn load_or_default() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_desktop_port")]
    pub desktop_port: u16,
    #[serde(default = "default_mobile_port")]
    pub mobile_port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_desktop_port() -> u16 {
    DESKTOP_PORT
}

fn default_mobile_port() -> u16 {
    MOBILE_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            desktop_port: default_desktop_port(),
            mobile_port: default_mobile_port(),
        }
    }
}

/// Timing of the automation worker, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_rebind_delay")]
    pub rebind_delay_ms: u64,
    #[serde(default = "default_type_interval")]
    pub type_interval_ms: u64,
    #[serde(default = "default_paste_wait")]
    pub paste_wait_ms: u64,
}

fn default_settle_delay() -> u64 {
    200
}

fn default_rebind_delay() -> u64 {
    100
}

fn default_type_interval() -> u64 {
    10
}

fn default_paste_wait() -> u64 {
    100
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay(),
            rebind_delay_ms: default_rebind_delay(),
            type_interval_ms: default_type_interval(),
            paste_wait_ms: default_paste_wait(),
        }
    }
}

impl AutomationConfig {
    /// All delays zeroed, for tests and headless runs
    pub fn immediate() -> Self {
        Self {
            settle_delay_ms: 0,
            rebind_delay_ms: 0,
            type_interval_ms: 0,
            paste_wait_ms: 0,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn rebind_delay(&self) -> Duration {
        Duration::from_millis(self.rebind_delay_ms)
    }

    pub fn type_interval(&self) -> Duration {
        Duration::from_millis(self.type_interval_ms)
    }

    pub fn paste_wait(&self) -> Duration {
        Duration::from_millis(self.paste_wait_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("[server]\nmobile_port = 9001\n").unwrap();
        assert_eq!(config.server.mobile_port, 9001);
        assert_eq!(config.server.desktop_port, DESKTOP_PORT);
        assert_eq!(config.automation.settle_delay_ms, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.mobile_port, MOBILE_PORT);
        assert_eq!(parsed.automation.type_interval_ms, 10);
    }
}
