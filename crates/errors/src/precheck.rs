//! Host precheck and version-parsing error kinds

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PrecheckError {
    #[error("invalid version string {value}: {message}")]
    InvalidVersion { value: String, message: String },

    #[error("precheck {name} could not run: {message}")]
    CheckFailed { name: String, message: String },

    #[error("invalid checkpoint configuration: {message}")]
    InvalidCheckpointConfig { message: String },

    #[error("invalid JVM heap configuration: {message}")]
    InvalidJvmConfig { message: String },
}
