//! Controller<->Agent wire message shapes (see §6.1)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of command types the Agent understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Precheck,
    Install,
    Uninstall,
    Upgrade,
    Start,
    Stop,
    Restart,
    Status,
    CollectLogs,
    TransferPackage,
    TransferPlugin,
    InstallPlugin,
    UninstallPlugin,
    ListPlugins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command_id: String,
    #[serde(rename = "type")]
    pub command_type: CommandType,
    pub params: HashMap<String, String>,
    pub timeout_s: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Running,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub status: CommandStatus,
    pub progress: u8,
    pub output: String,
    pub error: Option<String>,
}

impl CommandResponse {
    #[must_use]
    pub fn running(command_id: impl Into<String>, progress: u8, output: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            status: CommandStatus::Running,
            progress,
            output: output.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn success(command_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            status: CommandStatus::Success,
            progress: 100,
            output: output.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(command_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            status: CommandStatus::Failed,
            progress: 0,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Splits the `[<step>] <message>` progress-message convention used by
    /// step-aware commands into `(step_name, rest)`.
    #[must_use]
    pub fn parse_step_prefix(message: &str) -> Option<(&str, &str)> {
        let rest = message.strip_prefix('[')?;
        let (step, rest) = rest.split_once(']')?;
        Some((step.trim(), rest.trim_start()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHello {
    pub agent_id: String,
    pub ip: String,
    pub version: String,
    pub system_info: crate::host::SystemInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    pub agent_id: String,
    pub cpu_pct: f32,
    pub mem_pct: f32,
    pub disk_pct: f32,
    pub ts: chrono::DateTime<chrono::Utc>,
}
