//! Process supervisor and auto-restarter error kinds

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SupervisorError {
    #[error("process {name} is not tracked")]
    NotTracked { name: String },

    #[error("process {name} is in cooldown until {until}")]
    InCooldown { name: String, until: String },

    #[error("restart denied for {name}: max_restarts ({max}) reached within the time window")]
    RateLimited { name: String, max: u32 },

    #[error("failed to start process {name}: {message}")]
    StartFailed { name: String, message: String },

    #[error("failed to stop process {name}: {message}")]
    StopFailed { name: String, message: String },
}
