//! Command transport error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TransportError {
    #[error("command {command_id} timed out after {timeout_s}s")]
    Timeout { command_id: String, timeout_s: u64 },

    #[error("no channel open for agent {agent_id}")]
    ChannelClosed { agent_id: String },

    #[error("unknown command_id: {0}")]
    UnknownCommand(String),

    #[error("agent {agent_id} reported an error for {command_id}: {message}")]
    RemoteError {
        agent_id: String,
        command_id: String,
        message: String,
    },
}

impl ErrorKind for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ChannelClosed { .. })
    }
}
