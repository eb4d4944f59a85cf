//! Crash-restart rate limiting decision logic (§4.9)
//!
//! One [`fleet_types::RestartHistory`] per tracked process name, guarded
//! by a `DashMap` entry rather than one lock over the whole table, so a
//! decision for process A never blocks a decision for process B.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fleet_types::{RestartConfig, RestartHistory};
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartDecision {
    Proceed,
    Disabled,
    Denied { reason: String },
}

pub struct RestartController {
    config: RwLock<RestartConfig>,
    history: DashMap<String, RestartHistory>,
}

impl RestartController {
    #[must_use]
    pub fn new(config: RestartConfig) -> Self {
        Self {
            config: RwLock::new(config),
            history: DashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> RestartConfig {
        *self.config.read().expect("restart config lock poisoned")
    }

    /// Hot-updates the restart policy; takes effect on the next `decide`.
    pub fn set_config(&self, config: RestartConfig) {
        *self.config.write().expect("restart config lock poisoned") = config;
    }

    #[must_use]
    pub fn history_for(&self, name: &str) -> Option<RestartHistory> {
        self.history.get(name).map(|e| e.clone())
    }

    /// Decides whether `name` may restart `now`, per §4.9's algorithm.
    /// A just-elapsed cooldown resets the history as a side effect; a
    /// newly exhausted window enters cooldown as a side effect.
    pub fn decide(&self, name: &str, now: DateTime<Utc>) -> RestartDecision {
        let config = self.config();
        if !config.enabled {
            return RestartDecision::Disabled;
        }

        let mut entry = self
            .history
            .entry(name.to_string())
            .or_insert_with(|| RestartHistory::new(name));

        if let Some(cooldown_until) = entry.cooldown_until {
            if now < cooldown_until {
                return RestartDecision::Denied {
                    reason: format!("in cooldown until {cooldown_until}"),
                };
            }
            entry.restart_times.clear();
            entry.cooldown_until = None;
            entry.window_start = None;
        }

        let window_start = now - config.time_window;
        let restarts_in_window = entry.restart_times.iter().filter(|t| **t > window_start).count();

        if restarts_in_window as u32 >= config.max_restarts {
            entry.cooldown_until = Some(now + config.cooldown_period);
            return RestartDecision::Denied {
                reason: format!(
                    "max_restarts ({}) reached within the time window",
                    config.max_restarts
                ),
            };
        }

        RestartDecision::Proceed
    }

    /// Records a restart attempt's timestamp, regardless of its outcome.
    pub fn record_restart(&self, name: &str, now: DateTime<Utc>) {
        let mut entry = self
            .history
            .entry(name.to_string())
            .or_insert_with(|| RestartHistory::new(name));
        if entry.window_start.is_none() {
            entry.window_start = Some(now);
        }
        entry.restart_times.push(now);
        entry.last_restart = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(max_restarts: u32) -> RestartConfig {
        RestartConfig {
            enabled: true,
            restart_delay: Duration::from_secs(0),
            max_restarts,
            time_window: Duration::from_secs(300),
            cooldown_period: Duration::from_secs(1800),
        }
    }

    #[test]
    fn disabled_policy_never_proceeds() {
        let mut cfg = config(3);
        cfg.enabled = false;
        let rc = RestartController::new(cfg);
        assert_eq!(rc.decide("p1", Utc::now()), RestartDecision::Disabled);
    }

    #[test]
    fn allows_restarts_under_the_limit() {
        let rc = RestartController::new(config(3));
        let now = Utc::now();
        for _ in 0..3 {
            assert_eq!(rc.decide("p1", now), RestartDecision::Proceed);
            rc.record_restart("p1", now);
        }
        assert!(matches!(rc.decide("p1", now), RestartDecision::Denied { .. }));
    }

    #[test]
    fn entering_cooldown_denies_until_period_elapses() {
        let rc = RestartController::new(config(1));
        let now = Utc::now();
        rc.record_restart("p1", now);
        assert!(matches!(rc.decide("p1", now), RestartDecision::Denied { .. }));

        let history = rc.history_for("p1").unwrap();
        let cooldown_until = history.cooldown_until.unwrap();
        assert!(matches!(
            rc.decide("p1", cooldown_until - chrono::Duration::seconds(1)),
            RestartDecision::Denied { .. }
        ));

        assert_eq!(
            rc.decide("p1", cooldown_until + chrono::Duration::seconds(1)),
            RestartDecision::Proceed
        );
    }

    #[test]
    fn window_resets_entries_outside_time_window() {
        let rc = RestartController::new(config(1));
        let now = Utc::now();
        rc.record_restart("p1", now - chrono::Duration::seconds(400));
        assert_eq!(rc.decide("p1", now), RestartDecision::Proceed);
    }

    #[test]
    fn hot_update_takes_effect_immediately() {
        let rc = RestartController::new(config(1));
        let now = Utc::now();
        rc.record_restart("p1", now);
        assert!(matches!(rc.decide("p1", now), RestartDecision::Denied { .. }));

        rc.set_config(config(5));
        assert_eq!(rc.decide("p1", now), RestartDecision::Proceed);
    }
}
