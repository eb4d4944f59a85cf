//! Installation orchestrator and Agent executor error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("installation already in progress for host {host_id}")]
    AlreadyInProgress { host_id: String },

    #[error("no installation found for host {host_id}")]
    NotFound { host_id: String },

    #[error("no cached package for version {version}")]
    PackageNotFound { version: String },

    #[error("invalid installation request: {message}")]
    InvalidRequest { message: String },

    #[error("host agent not connected: {host_id}")]
    AgentNotConnected { host_id: String },

    #[error("step {step} is not retryable")]
    StepNotRetryable { step: String },

    #[error("path traversal attempt detected: {path}")]
    PathTraversal { path: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("integrity check failed: {message}")]
    IntegrityFailed { message: String },

    #[error("configuration edit failed for {path}: {message}")]
    ConfigEditFailed { path: String, message: String },

    #[error("plugin artifact not found for {plugin}")]
    PluginArtifactNotFound { plugin: String },

    #[error("remote step execution failed: {message}")]
    Remote { message: String },

    #[error("installation was cancelled")]
    Cancelled,
}

impl ErrorKind for InstallError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailed { .. }
                | Self::IntegrityFailed { .. }
                | Self::ConfigEditFailed { .. }
                | Self::PluginArtifactNotFound { .. }
                | Self::Remote { .. }
        )
    }
}
