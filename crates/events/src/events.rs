//! Domain-driven event types
//!
//! Every user-visible side effect in the system is expressed as one of
//! these before it reaches a sink (tracing, a CLI renderer, a progress
//! bar). No component prints or logs directly.

use crate::meta::EventLevel;
use fleet_types::InstallStep;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DownloadEvent {
    Started {
        version: String,
        mirror: String,
        url: String,
    },
    Progress {
        version: String,
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
        speed_bps: u64,
    },
    Completed {
        version: String,
        total_bytes: u64,
    },
    Failed {
        version: String,
        error: String,
    },
    Cancelled {
        version: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransferEvent {
    ChunkReceived {
        filename: String,
        offset: u64,
        total_size: u64,
    },
    Finalized {
        filename: String,
        size: u64,
    },
    Failed {
        filename: String,
        error: String,
    },
    Cancelled {
        filename: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InstallEvent {
    Started {
        installation_id: String,
        host_id: String,
    },
    StepStarted {
        installation_id: String,
        step: InstallStep,
    },
    StepProgress {
        installation_id: String,
        step: InstallStep,
        progress: u8,
        message: String,
    },
    StepCompleted {
        installation_id: String,
        step: InstallStep,
    },
    StepFailed {
        installation_id: String,
        step: InstallStep,
        error: String,
    },
    Completed {
        installation_id: String,
    },
    Failed {
        installation_id: String,
        error: String,
    },
    Cancelled {
        installation_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PrecheckEvent {
    Completed {
        host_id: String,
        overall_status: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SupervisorEvent {
    ProcessStarted {
        name: String,
        pid: Option<u32>,
    },
    ProcessStopped {
        name: String,
    },
    ProcessCrashed {
        name: String,
    },
    RestartScheduled {
        name: String,
        attempt: u32,
    },
    RestartDenied {
        name: String,
        reason: String,
    },
    CooldownEntered {
        name: String,
        until: chrono::DateTime<chrono::Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryEvent {
    AgentConnected { agent_id: String, host_id: String },
    AgentDisconnected { agent_id: String },
    HostOffline { host_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PluginEvent {
    Resolved { plugin: String, artifact: String },
    Downloaded { plugin: String, version: String },
    Installed { plugin: String, host_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeneralEvent {
    Info { message: String },
    Warning { message: String },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    Download(DownloadEvent),
    Transfer(TransferEvent),
    Install(InstallEvent),
    Precheck(PrecheckEvent),
    Supervisor(SupervisorEvent),
    Registry(RegistryEvent),
    Plugin(PluginEvent),
    General(GeneralEvent),
}

impl AppEvent {
    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::Download(DownloadEvent::Failed { .. })
            | Self::Transfer(TransferEvent::Failed { .. })
            | Self::Install(InstallEvent::StepFailed { .. } | InstallEvent::Failed { .. })
            | Self::Supervisor(SupervisorEvent::ProcessCrashed { .. })
            | Self::General(GeneralEvent::Error { .. }) => EventLevel::Error,

            Self::Supervisor(SupervisorEvent::RestartDenied { .. } | SupervisorEvent::CooldownEntered { .. })
            | Self::Registry(RegistryEvent::HostOffline { .. })
            | Self::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,

            Self::Download(DownloadEvent::Progress { .. })
            | Self::Transfer(TransferEvent::ChunkReceived { .. }) => EventLevel::Debug,

            _ => EventLevel::Info,
        }
    }

    #[must_use]
    pub const fn log_target(&self) -> &'static str {
        match self {
            Self::Download(_) => "fleetd::download",
            Self::Transfer(_) => "fleetd::transfer",
            Self::Install(_) => "fleetd::install",
            Self::Precheck(_) => "fleetd::precheck",
            Self::Supervisor(_) => "fleetd::supervisor",
            Self::Registry(_) => "fleetd::registry",
            Self::Plugin(_) => "fleetd::plugin",
            Self::General(_) => "fleetd::general",
        }
    }
}
