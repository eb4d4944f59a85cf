//! Event severity and source metadata

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl EventLevel {
    #[must_use]
    pub const fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Which side of the Controller<->Agent boundary emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    Controller,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMeta {
    pub source: EventSource,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl EventMeta {
    #[must_use]
    pub fn now(source: EventSource) -> Self {
        Self {
            source,
            timestamp: chrono::Utc::now(),
        }
    }
}
