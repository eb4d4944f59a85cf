#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Agent registry (component 5)
//!
//! Tracks one [`HostRecord`] per managed host, indexed by both
//! `host_id` and the owning `agent_id`. A background scanner flips
//! hosts whose heartbeat has gone stale to `offline` and emits a
//! [`RegistryEvent::HostOffline`].

use chrono::Utc;
use dashmap::DashMap;
use fleet_errors::{Error, RegistryError};
use fleet_events::{EventEmitter, EventSender, RegistryEvent};
use fleet_types::{AgentConnectionStatus, HostRecord, ResourceSample, SystemInfo};
use std::sync::Arc;
use std::time::Duration;

/// Default staleness threshold before a host is declared offline.
pub const DEFAULT_HEARTBEAT_TIMEOUT: chrono::Duration = chrono::Duration::seconds(120);

/// Interval at which the background scanner sweeps for stale hosts.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(5);

pub struct AgentRegistry {
    heartbeat_timeout: chrono::Duration,
    events: EventSender,
    hosts: DashMap<String, HostRecord>,
    by_agent: DashMap<String, String>,
}

impl AgentRegistry {
    #[must_use]
    pub fn new(events: EventSender) -> Self {
        Self::with_timeout(events, DEFAULT_HEARTBEAT_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(events: EventSender, heartbeat_timeout: chrono::Duration) -> Self {
        Self {
            heartbeat_timeout,
            events,
            hosts: DashMap::new(),
            by_agent: DashMap::new(),
        }
    }

    /// Registers a newly connected agent, creating a fresh host record
    /// keyed by a generated `host_id` if `host_id` is `None`, or
    /// attaching to an existing one otherwise (re-registration after a
    /// reconnect).
    pub fn register(
        &self,
        host_id: Option<String>,
        agent_id: &str,
        ip: &str,
        version: &str,
        system_info: SystemInfo,
    ) -> String {
        let host_id = host_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.hosts
            .entry(host_id.clone())
            .and_modify(|record| {
                record.agent_id = Some(agent_id.to_string());
                record.agent_status = AgentConnectionStatus::Connected;
                record.agent_version = Some(version.to_string());
                record.last_heartbeat = Some(Utc::now());
                record.system_info = system_info.clone();
            })
            .or_insert_with(|| HostRecord {
                id: host_id.clone(),
                ip: ip.to_string(),
                agent_id: Some(agent_id.to_string()),
                agent_status: AgentConnectionStatus::Connected,
                agent_version: Some(version.to_string()),
                last_heartbeat: Some(Utc::now()),
                system_info,
                resource_sample: ResourceSample::default(),
            });

        self.by_agent.insert(agent_id.to_string(), host_id.clone());
        self.events.emit_registry(RegistryEvent::AgentConnected {
            agent_id: agent_id.to_string(),
            host_id: host_id.clone(),
        });
        host_id
    }

    /// Records a heartbeat's resource sample and refreshes liveness.
    ///
    /// # Errors
    /// Returns `RegistryError::AgentNotFound` if `agent_id` has never
    /// registered.
    pub fn heartbeat(
        &self,
        agent_id: &str,
        cpu_pct: f32,
        mem_pct: f32,
        disk_pct: f32,
    ) -> Result<(), Error> {
        let host_id = self
            .by_agent
            .get(agent_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| RegistryError::AgentNotFound {
                agent_id: agent_id.to_string(),
            })?;

        let mut record = self
            .hosts
            .get_mut(&host_id)
            .ok_or_else(|| RegistryError::HostNotFound {
                host_id: host_id.clone(),
            })?;
        record.last_heartbeat = Some(Utc::now());
        record.agent_status = AgentConnectionStatus::Connected;
        record.resource_sample = ResourceSample {
            cpu_pct,
            mem_pct,
            disk_pct,
        };
        Ok(())
    }

    /// Looks up a host record by the agent's id.
    #[must_use]
    pub fn get(&self, agent_id: &str) -> Option<HostRecord> {
        let host_id = self.by_agent.get(agent_id)?.value().clone();
        self.hosts.get(&host_id).map(|r| r.clone())
    }

    /// Returns `(agent_id, connected)` for a host, where `connected` is
    /// true iff the host's stream is open and its heartbeat is recent.
    #[must_use]
    pub fn get_by_host(&self, host_id: &str) -> Option<(Option<String>, bool)> {
        let record = self.hosts.get(host_id)?;
        let connected = record.agent_status == AgentConnectionStatus::Connected
            && record.is_online(Utc::now(), self.heartbeat_timeout);
        Some((record.agent_id.clone(), connected))
    }

    #[must_use]
    pub fn list(&self) -> Vec<HostRecord> {
        self.hosts.iter().map(|e| e.value().clone()).collect()
    }

    /// Sweeps all hosts once, transitioning any whose heartbeat has
    /// exceeded the configured timeout to `offline`.
    pub fn sweep_offline(&self) {
        let now = Utc::now();
        for mut entry in self.hosts.iter_mut() {
            if entry.agent_status == AgentConnectionStatus::Connected
                && !entry.is_online(now, self.heartbeat_timeout)
            {
                entry.agent_status = AgentConnectionStatus::Offline;
                self.events.emit_registry(RegistryEvent::HostOffline {
                    host_id: entry.id.clone(),
                });
            }
        }
    }
}

/// Spawns a background task that calls [`AgentRegistry::sweep_offline`]
/// every [`SCAN_INTERVAL`] until the returned handle is dropped/aborted.
pub fn spawn_scanner(registry: Arc<AgentRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SCAN_INTERVAL);
        loop {
            interval.tick().await;
            registry.sweep_offline();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_system_info() -> SystemInfo {
        SystemInfo {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            cpu_cores: 8,
            total_memory: 16_000_000_000,
            total_disk: 500_000_000_000,
        }
    }

    #[test]
    fn register_then_heartbeat_keeps_host_online() {
        let (tx, _rx) = fleet_events::channel();
        let registry = AgentRegistry::new(tx);
        let host_id = registry.register(None, "agent-1", "10.0.0.1", "1.0.0", sample_system_info());

        registry.heartbeat("agent-1", 10.0, 20.0, 30.0).unwrap();
        let (agent_id, connected) = registry.get_by_host(&host_id).unwrap();
        assert_eq!(agent_id.as_deref(), Some("agent-1"));
        assert!(connected);
    }

    #[test]
    fn heartbeat_for_unknown_agent_is_not_found() {
        let (tx, _rx) = fleet_events::channel();
        let registry = AgentRegistry::new(tx);
        let err = registry.heartbeat("ghost", 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            Error::Registry(RegistryError::AgentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn stale_heartbeat_is_swept_offline() {
        let (tx, mut rx) = fleet_events::channel();
        let registry = AgentRegistry::with_timeout(tx, chrono::Duration::seconds(-1));
        let host_id = registry.register(None, "agent-1", "10.0.0.1", "1.0.0", sample_system_info());

        registry.sweep_offline();

        let (_, connected) = registry.get_by_host(&host_id).unwrap();
        assert!(!connected);

        let connect_event = rx.recv().await.unwrap();
        assert!(matches!(
            connect_event,
            fleet_events::AppEvent::Registry(fleet_events::RegistryEvent::AgentConnected { .. })
        ));
        let offline_event = rx.recv().await.unwrap();
        assert!(matches!(
            offline_event,
            fleet_events::AppEvent::Registry(fleet_events::RegistryEvent::HostOffline { .. })
        ));
    }
}
