#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration loading for the Controller and Agent binaries
//!
//! Layered the same way for both: hard-coded defaults, a TOML file on
//! disk (`~/.config/fleetd/config.toml` unless overridden), then a
//! handful of `FLEETD_*` environment overrides. CLI flags, if any, are
//! applied by the caller after `load_or_default` returns.

pub mod constants;
pub mod core;
pub mod resources_semaphore;

pub use core::{AgentConfig, ConcurrencyConfig, ControllerConfig, LoggingConfig, NetworkConfig};

use fleet_errors::{ConfigError, Error};
use fleet_types::RestartConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Root configuration shared by both binaries. Each reads only the
/// sections it cares about; an Agent host never needs `controller`, and
/// a Controller never needs `agent`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub restart: RestartConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the default config file path: `~/.config/fleetd/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let home_dir = dirs::home_dir().ok_or_else(|| ConfigError::ReadFailed {
            path: "home directory".to_string(),
            message: "could not determine home directory".to_string(),
        })?;
        Ok(home_dir
            .join(".config")
            .join(constants::CONFIG_DIR_NAME)
            .join("config.toml"))
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid
    /// TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseFailed { message: e.to_string() }.into())
    }

    /// Load from the default path, writing a fresh default config file
    /// if none exists yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or
    /// parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            let config = Self::default();
            if let Err(e) = config.save().await {
                tracing::warn!("failed to save default config: {}", e);
            }
            Ok(config)
        }
    }

    /// Load from `path` if given, else fall back to [`Config::load`].
    ///
    /// # Errors
    /// Returns an error if the chosen source cannot be read or parsed.
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Apply `FLEETD_*` environment variable overrides in place.
    ///
    /// # Errors
    /// Returns an error if an override's value cannot be parsed into
    /// the field's type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(v) = std::env::var("FLEETD_BIND_ADDR") {
            self.controller.bind_addr = v;
        }
        if let Ok(v) = std::env::var("FLEETD_CONTROLLER_ADDR") {
            self.agent.controller_addr = v;
        }
        if let Ok(v) = std::env::var("FLEETD_CACHE_DIR") {
            self.controller.cache_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FLEETD_INSTALL_DIR") {
            self.agent.install_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FLEETD_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("FLEETD_LOG_JSON") {
            self.logging.json = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("FLEETD_MAX_PARALLEL_INSTALLS") {
            self.concurrency.max_parallel_installs =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "FLEETD_MAX_PARALLEL_INSTALLS".to_string(),
                    message: format!("not a valid integer: {v}"),
                })?;
        }
        if let Ok(v) = std::env::var("FLEETD_MAX_PARALLEL_DOWNLOADS") {
            self.concurrency.max_parallel_downloads =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "FLEETD_MAX_PARALLEL_DOWNLOADS".to_string(),
                    message: format!("not a valid integer: {v}"),
                })?;
        }
        if let Ok(v) = std::env::var("FLEETD_HEARTBEAT_TIMEOUT_S") {
            self.controller.heartbeat_timeout_s =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "FLEETD_HEARTBEAT_TIMEOUT_S".to_string(),
                    message: format!("not a valid integer: {v}"),
                })?;
        }

        Ok(())
    }

    /// Save to the default path, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self) -> Result<(), Error> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path).await
    }

    /// Save to a specific path, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub async fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteFailed {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteFailed {
            path: path.display().to_string(),
            message: format!("serialization failed: {e}"),
        })?;

        let content = format!(
            "# fleetd configuration file\n\
             # generated automatically; edit to customize Controller/Agent behavior\n\n\
             {toml_string}"
        );

        fs::write(path, content)
            .await
            .map_err(|e| ConfigError::WriteFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Validate cross-field invariants that serde's per-field defaults
    /// cannot express on their own.
    ///
    /// # Errors
    /// Returns an error describing the first invalid field found.
    pub fn validate(&self) -> Result<(), Error> {
        if self.network.timeout_s == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.timeout_s".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        if self.concurrency.max_parallel_installs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency.max_parallel_installs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        if self.concurrency.max_parallel_downloads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency.max_parallel_downloads".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Calculate a worker count from an explicit override, or auto-detect
/// from available CPUs (75%, minimum 1) when the override is `0`.
#[must_use]
pub fn calculate_worker_count(config_value: usize) -> usize {
    if config_value > 0 {
        config_value
    } else {
        let cpus = num_cpus::get();
        (cpus * 3 / 4).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Guards tests that mutate process environment variables so they
    // don't race each other.
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[tokio::test]
    async fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.controller.bind_addr = "0.0.0.0:9999".to_string();
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.controller.bind_addr, "0.0.0.0:9999");
    }

    #[test]
    fn merge_env_applies_overrides() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("FLEETD_LOG_LEVEL", "debug");
        std::env::set_var("FLEETD_MAX_PARALLEL_INSTALLS", "16");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.concurrency.max_parallel_installs, 16);

        std::env::remove_var("FLEETD_LOG_LEVEL");
        std::env::remove_var("FLEETD_MAX_PARALLEL_INSTALLS");
    }

    #[test]
    fn merge_env_rejects_unparseable_override() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("FLEETD_MAX_PARALLEL_INSTALLS", "not-a-number");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        std::env::remove_var("FLEETD_MAX_PARALLEL_INSTALLS");
    }
}
