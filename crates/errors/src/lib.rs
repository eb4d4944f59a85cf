#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the fleet deployment control plane
//!
//! Organized by domain, one enum per crate the error originates in, all
//! aggregated into the root [`Error`] via `#[from]`. Kinds map to the
//! taxonomy in the design's error-handling section: `validation`,
//! `not_found`, `conflict`, `integrity`, `io`, `timeout`, `remote`,
//! `offline`, `config`.

pub mod config;
pub mod install;
pub mod network;
pub mod plugin;
pub mod precheck;
pub mod registry;
pub mod supervisor;
pub mod transfer;
pub mod transport;

pub use config::ConfigError;
pub use install::InstallError;
pub use network::NetworkError;
pub use plugin::PluginError;
pub use precheck::PrecheckError;
pub use registry::RegistryError;
pub use supervisor::SupervisorError;
pub use transfer::TransferError;
pub use transport::TransportError;

use thiserror::Error;

/// Broad recoverability classification, independent of the concrete kind.
/// Used by callers deciding whether to retry automatically.
pub trait ErrorKind {
    fn is_retryable(&self) -> bool;
}

/// Generic error type for cross-crate boundaries.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("precheck error: {0}")]
    Precheck(#[from] PrecheckError),

    #[error("supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {message}")]
    Io {
        #[cfg_attr(feature = "serde", serde(with = "io_kind_as_str"))]
        kind: std::io::ErrorKind,
        message: String,
        #[cfg_attr(feature = "serde", serde(with = "opt_path_buf"))]
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    #[must_use]
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Whether the layer that produced this error considers it safe to retry
    /// automatically, per the error taxonomy's "recoverable by" column.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            Self::Transfer(e) => e.is_retryable(),
            Self::Install(e) => e.is_retryable(),
            Self::Transport(e) => e.is_retryable(),
            Self::Registry(e) => e.is_retryable(),
            Self::Plugin(e) => e.is_retryable(),
            Self::Io { .. } => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

#[cfg(feature = "serde")]
mod io_kind_as_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::io::ErrorKind;

    pub fn serialize<S: Serializer>(kind: &ErrorKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{kind:?}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ErrorKind, D::Error> {
        let _ = String::deserialize(d)?;
        Ok(ErrorKind::Other)
    }
}

#[cfg(feature = "serde")]
mod opt_path_buf {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::path::PathBuf;

    pub fn serialize<S: Serializer>(p: &Option<PathBuf>, s: S) -> Result<S::Ok, S::Error> {
        match p {
            Some(p) => s.serialize_str(&p.display().to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PathBuf>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(PathBuf::from))
    }
}
