//! Centralized, non-configurable filesystem paths for fleetd
//!
//! These are deliberately not exposed via TOML configuration: the
//! config directory name and default state path are part of how an
//! operator finds a running Controller or Agent on disk.

pub const CONFIG_DIR_NAME: &str = "fleetd";

pub const DEFAULT_CACHE_DIR: &str = "/var/lib/fleetd/cache";
pub const DEFAULT_STATE_DIR: &str = "/var/lib/fleetd/state";
pub const DEFAULT_INSTALL_DIR: &str = "/opt/seatunnel";
pub const DEFAULT_LOG_DIR: &str = "/var/log/fleetd";
