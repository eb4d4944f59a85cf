//! Crash-restart rate limiting configuration and history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestartConfig {
    pub enabled: bool,
    #[serde(with = "duration_secs")]
    pub restart_delay: Duration,
    pub max_restarts: u32,
    #[serde(with = "duration_secs")]
    pub time_window: Duration,
    #[serde(with = "duration_secs")]
    pub cooldown_period: Duration,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            restart_delay: Duration::from_secs(5),
            max_restarts: 3,
            time_window: Duration::from_secs(300),
            cooldown_period: Duration::from_secs(1800),
        }
    }
}

/// Per-process restart bookkeeping. Invariant: every entry in
/// `restart_times` falls within `[now - time_window, now]` immediately
/// after each `record` call; `cooldown_until > now` implies no restart is
/// currently permitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestartHistory {
    pub name: String,
    pub restart_times: Vec<DateTime<Utc>>,
    pub last_restart: Option<DateTime<Utc>>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub window_start: Option<DateTime<Utc>>,
}

impl RestartHistory {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
