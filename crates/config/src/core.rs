//! Controller- and Agent-side configuration sections
//!
//! Each section pairs a `#[serde(default = "fn")]` field with a free
//! default-value function so a partial TOML file still deserializes,
//! and an explicit `impl Default` so `Config::default()` needs no file
//! at all.

use fleet_types::MirrorId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings the Controller binary reads at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_mirror")]
    pub default_mirror: MirrorId,
    #[serde(default = "default_command_timeout_s")]
    pub command_timeout_s: u64,
    #[serde(default = "default_heartbeat_timeout_s")]
    pub heartbeat_timeout_s: u64,
    #[serde(default)]
    pub plugin_repo: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cache_dir: default_cache_dir(),
            default_mirror: default_mirror(),
            command_timeout_s: default_command_timeout_s(),
            heartbeat_timeout_s: default_heartbeat_timeout_s(),
            plugin_repo: None,
        }
    }
}

/// Settings the Agent binary reads at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_controller_addr")]
    pub controller_addr: String,
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
    #[serde(default = "default_heartbeat_interval_s")]
    pub heartbeat_interval_s: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            controller_addr: default_controller_addr(),
            install_dir: default_install_dir(),
            heartbeat_interval_s: default_heartbeat_interval_s(),
        }
    }
}

/// HTTP/mirror network tuning, shared by the download and plugin paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_s")]
    pub retry_delay_s: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_s: default_timeout_s(),
            retries: default_retries(),
            retry_delay_s: default_retry_delay_s(),
        }
    }
}

/// Caps on how many of each kind of operation run at once across all
/// hosts. Consumed via [`crate::resources_semaphore::create_semaphore`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_max_parallel_downloads")]
    pub max_parallel_downloads: usize,
    #[serde(default = "default_max_parallel_installs")]
    pub max_parallel_installs: usize,
    #[serde(default = "default_max_parallel_transfers")]
    pub max_parallel_transfers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_parallel_downloads: default_max_parallel_downloads(),
            max_parallel_installs: default_max_parallel_installs(),
            max_parallel_transfers: default_max_parallel_transfers(),
        }
    }
}

/// `tracing` subscriber configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:7420".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(crate::constants::DEFAULT_CACHE_DIR)
}

fn default_mirror() -> MirrorId {
    MirrorId::recommended()
}

fn default_command_timeout_s() -> u64 {
    60
}

fn default_heartbeat_timeout_s() -> u64 {
    90
}

fn default_controller_addr() -> String {
    "127.0.0.1:7420".to_string()
}

fn default_install_dir() -> PathBuf {
    PathBuf::from(crate::constants::DEFAULT_INSTALL_DIR)
}

fn default_heartbeat_interval_s() -> u64 {
    30
}

fn default_timeout_s() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_s() -> u64 {
    2
}

fn default_max_parallel_downloads() -> usize {
    4
}

fn default_max_parallel_installs() -> usize {
    8
}

fn default_max_parallel_transfers() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let controller = ControllerConfig::default();
        assert_eq!(controller.default_mirror, MirrorId::recommended());
        assert!(controller.command_timeout_s > 0);
    }
}
