//! Host/Agent identity and liveness bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connectivity state of the Agent owning a host, as seen by the Controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentConnectionStatus {
    /// No Agent has ever registered for this host.
    None,
    /// An Agent is installed but its stream is not currently open.
    Installed,
    /// The Agent's heartbeat has exceeded the configured timeout.
    Offline,
    /// The Agent's stream is open and heartbeats are recent.
    Connected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: u32,
    pub total_memory: u64,
    pub total_disk: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResourceSample {
    pub cpu_pct: f32,
    pub mem_pct: f32,
    pub disk_pct: f32,
}

/// Everything the Controller knows about one managed host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: String,
    pub ip: String,
    pub agent_id: Option<String>,
    pub agent_status: AgentConnectionStatus,
    pub agent_version: Option<String>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub system_info: SystemInfo,
    pub resource_sample: ResourceSample,
}

impl HostRecord {
    /// A host is online iff its last heartbeat is within `heartbeat_timeout`
    /// of `now`. A host with no heartbeat yet is never online.
    #[must_use]
    pub fn is_online(&self, now: DateTime<Utc>, heartbeat_timeout: chrono::Duration) -> bool {
        self.last_heartbeat
            .is_some_and(|hb| now - hb < heartbeat_timeout)
    }
}
