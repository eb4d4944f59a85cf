#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions shared by the Controller and Agent
//!
//! This crate has no I/O of its own: it is the data model described in
//! the installation orchestration engine's design, kept dependency-free
//! of the crates that act on it so both sides of the wire can share it.

pub mod command;
pub mod host;
pub mod install;
pub mod mirror;
pub mod package;
pub mod precheck;
pub mod restart;
pub mod version;

pub use command::{
    AgentHello, CommandRequest, CommandResponse, CommandStatus, CommandType, Heartbeat,
};
pub use host::{AgentConnectionStatus, HostRecord, ResourceSample, SystemInfo};
pub use install::{
    CheckpointConfig, CheckpointStorageType, ConnectorsConfig, DeploymentMode, InstallMode,
    InstallStep, InstallationRequest, InstallationStatus, JvmConfig, NodeRole, StepInfo,
    StepStatus,
};
pub use mirror::MirrorId;
pub use package::Package;
pub use precheck::{PrecheckItem, PrecheckResult, PrecheckStatus};
pub use restart::{RestartConfig, RestartHistory};
pub use version::{java_major_version, EngineVersion};
