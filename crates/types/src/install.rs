//! Installation request/state machine types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    Hybrid,
    Separated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Master,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointStorageType {
    LocalFile,
    Hdfs,
    Oss,
    S3,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointConfig {
    pub storage_type: Option<CheckpointStorageType>,
    pub namespace: Option<String>,
    pub hdfs_namenode_host: Option<String>,
    pub hdfs_namenode_port: Option<u16>,
    pub storage_endpoint: Option<String>,
    pub storage_access_key: Option<String>,
    pub storage_secret_key: Option<String>,
    pub storage_bucket: Option<String>,
}

/// JVM heap sizes in GB, keyed by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JvmConfig {
    pub hybrid: Option<u32>,
    pub master: Option<u32>,
    pub worker: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorsConfig {
    pub install: bool,
    pub selected: Vec<String>,
    pub repo: Option<String>,
}

/// A request to install the engine on one host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRequest {
    pub host_id: String,
    pub cluster_id: String,
    pub version: String,
    pub install_mode: InstallMode,
    pub mirror: Option<crate::mirror::MirrorId>,
    pub package_path: Option<String>,
    pub expected_checksum: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub node_role: NodeRole,
    pub master_addrs: Vec<String>,
    pub worker_addrs: Vec<String>,
    pub cluster_port: u16,
    pub worker_port: Option<u16>,
    pub http_port: u16,
    pub dynamic_slot: Option<u32>,
    pub jvm: JvmConfig,
    pub checkpoint: CheckpointConfig,
    pub connectors: ConnectorsConfig,
}

impl InstallationRequest {
    pub const DEFAULT_CLUSTER_PORT: u16 = 5801;
    pub const DEFAULT_HTTP_PORT: u16 = 8080;

    #[must_use]
    pub fn cluster_port_or_default(&self) -> u16 {
        if self.cluster_port == 0 {
            Self::DEFAULT_CLUSTER_PORT
        } else {
            self.cluster_port
        }
    }

    #[must_use]
    pub fn http_port_or_default(&self) -> u16 {
        if self.http_port == 0 {
            Self::DEFAULT_HTTP_PORT
        } else {
            self.http_port
        }
    }

    /// Flattens this request into the `string -> string` parameter map the
    /// wire protocol carries for the `install` command: booleans as
    /// "true"/"false", integers decimal, lists comma-separated.
    #[must_use]
    pub fn to_param_map(&self) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("cluster_id".into(), self.cluster_id.clone());
        m.insert("version".into(), self.version.clone());
        m.insert(
            "install_mode".into(),
            match self.install_mode {
                InstallMode::Online => "online",
                InstallMode::Offline => "offline",
            }
            .into(),
        );
        if let Some(p) = &self.package_path {
            m.insert("package_path".into(), p.clone());
        }
        if let Some(c) = &self.expected_checksum {
            m.insert("expected_checksum".into(), c.clone());
        }
        m.insert(
            "deployment_mode".into(),
            match self.deployment_mode {
                DeploymentMode::Hybrid => "hybrid",
                DeploymentMode::Separated => "separated",
            }
            .into(),
        );
        m.insert(
            "node_role".into(),
            match self.node_role {
                NodeRole::Master => "master",
                NodeRole::Worker => "worker",
            }
            .into(),
        );
        m.insert("master_addrs".into(), self.master_addrs.join(","));
        m.insert("worker_addrs".into(), self.worker_addrs.join(","));
        m.insert(
            "cluster_port".into(),
            self.cluster_port_or_default().to_string(),
        );
        if let Some(wp) = self.worker_port {
            m.insert("worker_port".into(), wp.to_string());
        }
        m.insert(
            "http_port".into(),
            self.http_port_or_default().to_string(),
        );
        if let Some(ds) = self.dynamic_slot {
            m.insert("dynamic_slot".into(), ds.to_string());
        }
        if let Some(h) = self.jvm.hybrid {
            m.insert("jvm_hybrid".into(), h.to_string());
        }
        if let Some(h) = self.jvm.master {
            m.insert("jvm_master".into(), h.to_string());
        }
        if let Some(h) = self.jvm.worker {
            m.insert("jvm_worker".into(), h.to_string());
        }
        if let Some(st) = self.checkpoint.storage_type {
            m.insert(
                "checkpoint_storage_type".into(),
                match st {
                    CheckpointStorageType::LocalFile => "LOCAL_FILE",
                    CheckpointStorageType::Hdfs => "HDFS",
                    CheckpointStorageType::Oss => "OSS",
                    CheckpointStorageType::S3 => "S3",
                }
                .into(),
            );
        }
        if let Some(ns) = &self.checkpoint.namespace {
            m.insert("checkpoint_namespace".into(), ns.clone());
        }
        if let Some(h) = &self.checkpoint.hdfs_namenode_host {
            m.insert("checkpoint_hdfs_namenode_host".into(), h.clone());
        }
        if let Some(p) = self.checkpoint.hdfs_namenode_port {
            m.insert("checkpoint_hdfs_namenode_port".into(), p.to_string());
        }
        if let Some(e) = &self.checkpoint.storage_endpoint {
            m.insert("checkpoint_storage_endpoint".into(), e.clone());
        }
        if let Some(k) = &self.checkpoint.storage_access_key {
            m.insert("checkpoint_storage_access_key".into(), k.clone());
        }
        if let Some(k) = &self.checkpoint.storage_secret_key {
            m.insert("checkpoint_storage_secret_key".into(), k.clone());
        }
        if let Some(b) = &self.checkpoint.storage_bucket {
            m.insert("checkpoint_storage_bucket".into(), b.clone());
        }
        m.insert(
            "connectors_install".into(),
            self.connectors.install.to_string(),
        );
        m.insert(
            "connectors_selected".into(),
            self.connectors.selected.join(","),
        );
        m
    }
}

/// The fixed, ordered alphabet of installation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStep {
    Download,
    Verify,
    Extract,
    ConfigureCluster,
    ConfigureCheckpoint,
    ConfigureRuntime,
    InstallPlugins,
    RegisterCluster,
    Complete,
}

impl InstallStep {
    pub const ORDER: [Self; 9] = [
        Self::Download,
        Self::Verify,
        Self::Extract,
        Self::ConfigureCluster,
        Self::ConfigureCheckpoint,
        Self::ConfigureRuntime,
        Self::InstallPlugins,
        Self::RegisterCluster,
        Self::Complete,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Download => 0,
            Self::Verify => 1,
            Self::Extract => 2,
            Self::ConfigureCluster => 3,
            Self::ConfigureCheckpoint => 4,
            Self::ConfigureRuntime => 5,
            Self::InstallPlugins => 6,
            Self::RegisterCluster => 7,
            Self::Complete => 8,
        }
    }

    /// Only the terminal `complete` step is non-retryable.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        !matches!(self, Self::Complete)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Verify => "verify",
            Self::Extract => "extract",
            Self::ConfigureCluster => "configure_cluster",
            Self::ConfigureCheckpoint => "configure_checkpoint",
            Self::ConfigureRuntime => "configure_runtime",
            Self::InstallPlugins => "install_plugins",
            Self::RegisterCluster => "register_cluster",
            Self::Complete => "complete",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Download => "Transfer or fetch the engine package",
            Self::Verify => "Verify package integrity",
            Self::Extract => "Extract the package into the install directory",
            Self::ConfigureCluster => "Write cluster membership and port configuration",
            Self::ConfigureCheckpoint => "Write checkpoint storage configuration",
            Self::ConfigureRuntime => "Write JVM heap configuration",
            Self::InstallPlugins => "Install selected connector plugins",
            Self::RegisterCluster => "Notify the Controller the node is ready",
            Self::Complete => "Installation complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInfo {
    pub step: InstallStep,
    pub name: String,
    pub description: String,
    pub status: StepStatus,
    pub progress: u8,
    pub message: Option<String>,
    pub error: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub retryable: bool,
}

impl StepInfo {
    #[must_use]
    pub fn pending(step: InstallStep) -> Self {
        Self {
            step,
            name: step.name().to_string(),
            description: step.description().to_string(),
            status: StepStatus::Pending,
            progress: 0,
            message: None,
            error: None,
            start_time: None,
            end_time: None,
            retryable: step.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationState {
    Pending,
    Running,
    Success,
    Failed,
}

/// The full lifecycle record for one host's installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationStatus {
    pub id: String,
    pub host_id: String,
    pub status: InstallationState,
    pub current_step: InstallStep,
    pub steps: Vec<StepInfo>,
    pub overall_progress: u8,
    pub message: Option<String>,
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl InstallationStatus {
    #[must_use]
    pub fn new(id: String, host_id: String) -> Self {
        Self {
            id,
            host_id,
            status: InstallationState::Pending,
            current_step: InstallStep::Download,
            steps: InstallStep::ORDER.into_iter().map(StepInfo::pending).collect(),
            overall_progress: 0,
            message: None,
            error: None,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn step_mut(&mut self, step: InstallStep) -> &mut StepInfo {
        &mut self.steps[step.index()]
    }

    #[must_use]
    pub fn step(&self, step: InstallStep) -> &StepInfo {
        &self.steps[step.index()]
    }
}
