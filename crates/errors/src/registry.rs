//! Agent registry error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RegistryError {
    #[error("agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    #[error("host not found: {host_id}")]
    HostNotFound { host_id: String },

    #[error("agent already registered for host {host_id}")]
    AlreadyRegistered { host_id: String },
}

impl ErrorKind for RegistryError {
    fn is_retryable(&self) -> bool {
        false
    }
}
