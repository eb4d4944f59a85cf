//! Process supervision and crash-restart driving loop (§4.9)

use crate::process::{ProcessController, RestartCallback, RestartOutcome, StartOutcome};
use crate::restart_controller::{RestartController, RestartDecision};
use dashmap::DashMap;
use fleet_errors::{Error, SupervisorError};
use fleet_events::{EventEmitter, EventSender, SupervisorEvent};
use fleet_types::RestartConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::time::sleep;

struct ProcessEntry {
    role: String,
    start_params: HashMap<String, String>,
    manually_stopped: bool,
    pid: Option<u32>,
}

/// Tracks started engine processes and drives the restart-on-crash
/// loop. One entry per `host_id`; `DashMap` so a crash on one host
/// never blocks a lookup for another.
pub struct ProcessSupervisor {
    events: EventSender,
    controller: Arc<dyn ProcessController>,
    callback: Arc<dyn RestartCallback>,
    restart: RestartController,
    processes: DashMap<String, Mutex<ProcessEntry>>,
}

impl ProcessSupervisor {
    #[must_use]
    pub fn new(
        events: EventSender,
        controller: Arc<dyn ProcessController>,
        callback: Arc<dyn RestartCallback>,
        restart_config: RestartConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            events,
            controller,
            callback,
            restart: RestartController::new(restart_config),
            processes: DashMap::new(),
        })
    }

    /// Hot-updates the restart policy for every tracked process.
    pub fn set_restart_config(&self, config: RestartConfig) {
        self.restart.set_config(config);
    }

    /// Starts (or records an already-running) process on `host_id` and
    /// begins tracking it for crash detection.
    ///
    /// # Errors
    /// Propagates whatever the underlying `ProcessController` returns.
    pub async fn start(
        &self,
        host_id: &str,
        role: &str,
        params: HashMap<String, String>,
    ) -> Result<(), Error> {
        let outcome = self.controller.start_process(host_id, role, &params).await?;
        let pid = match outcome {
            StartOutcome::Started { pid } => pid,
            StartOutcome::AlreadyRunning => None,
        };

        self.processes.insert(
            host_id.to_string(),
            Mutex::new(ProcessEntry {
                role: role.to_string(),
                start_params: params,
                manually_stopped: false,
                pid,
            }),
        );
        self.events.emit_supervisor(SupervisorEvent::ProcessStarted {
            name: host_id.to_string(),
            pid,
        });
        Ok(())
    }

    /// Explicitly stops a tracked process; its next crash notification
    /// (the exit this causes) is then ignored as intentional.
    ///
    /// # Errors
    /// Returns `SupervisorError::NotTracked` if `host_id` is unknown, or
    /// whatever the underlying `ProcessController` returns.
    pub async fn stop(&self, host_id: &str) -> Result<(), Error> {
        {
            let entry = self
                .processes
                .get(host_id)
                .ok_or_else(|| SupervisorError::NotTracked { name: host_id.to_string() })?;
            entry.lock().expect("process entry lock poisoned").manually_stopped = true;
        }
        self.controller.stop_process(host_id).await?;
        self.events.emit_supervisor(SupervisorEvent::ProcessStopped {
            name: host_id.to_string(),
        });
        Ok(())
    }

    /// Reports an observed process exit. A no-op if the process was
    /// stopped intentionally via [`Self::stop`]; otherwise spawns the
    /// restart decision on its own task, per the concurrency model's
    /// "every long operation runs on its own logical task".
    ///
    /// # Errors
    /// Returns `SupervisorError::NotTracked` if `host_id` is unknown.
    pub fn notify_crash(self: &Arc<Self>, host_id: &str) -> Result<(), Error> {
        let manually_stopped = {
            let entry = self
                .processes
                .get(host_id)
                .ok_or_else(|| SupervisorError::NotTracked { name: host_id.to_string() })?;
            entry.lock().expect("process entry lock poisoned").manually_stopped
        };
        if manually_stopped {
            return Ok(());
        }

        self.events.emit_supervisor(SupervisorEvent::ProcessCrashed {
            name: host_id.to_string(),
        });

        let this = Arc::clone(self);
        let host_id = host_id.to_string();
        tokio::spawn(async move { this.drive_restart(&host_id).await });
        Ok(())
    }

    async fn drive_restart(&self, host_id: &str) {
        let now = chrono::Utc::now();
        let decision = self.restart.decide(host_id, now);

        let outcome = match decision {
            RestartDecision::Disabled => RestartOutcome::Disabled,
            RestartDecision::Denied { reason } => {
                self.events.emit_supervisor(SupervisorEvent::RestartDenied {
                    name: host_id.to_string(),
                    reason: reason.clone(),
                });
                if let Some(history) = self.restart.history_for(host_id) {
                    if let Some(until) = history.cooldown_until {
                        self.events.emit_supervisor(SupervisorEvent::CooldownEntered {
                            name: host_id.to_string(),
                            until,
                        });
                    }
                }
                RestartOutcome::Denied { reason }
            }
            RestartDecision::Proceed => self.attempt_restart(host_id).await,
        };

        self.callback.on_restart(host_id, &outcome).await;
    }

    async fn attempt_restart(&self, host_id: &str) -> RestartOutcome {
        let attempt = self
            .restart
            .history_for(host_id)
            .map_or(1, |h| h.restart_times.len() as u32 + 1);
        self.events.emit_supervisor(SupervisorEvent::RestartScheduled {
            name: host_id.to_string(),
            attempt,
        });

        sleep(self.restart.config().restart_delay).await;

        if !self.restart.config().enabled {
            return RestartOutcome::Disabled;
        }

        let (role, params) = {
            let Some(entry) = self.processes.get(host_id) else {
                return RestartOutcome::Failed {
                    message: format!("process {host_id} no longer tracked"),
                };
            };
            let entry = entry.lock().expect("process entry lock poisoned");
            (entry.role.clone(), entry.start_params.clone())
        };

        let result = self.controller.start_process(host_id, &role, &params).await;
        self.restart.record_restart(host_id, chrono::Utc::now());

        match result {
            Ok(StartOutcome::Started { pid }) => {
                if let Some(entry) = self.processes.get(host_id) {
                    let mut entry = entry.lock().expect("process entry lock poisoned");
                    entry.pid = pid;
                    entry.manually_stopped = false;
                }
                self.events.emit_supervisor(SupervisorEvent::ProcessStarted {
                    name: host_id.to_string(),
                    pid,
                });
                RestartOutcome::Started { pid }
            }
            Ok(StartOutcome::AlreadyRunning) => RestartOutcome::AlreadyRunning,
            Err(e) => RestartOutcome::Failed { message: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::NoopRestartCallback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct CountingController {
        calls: AtomicU32,
        notify: Notify,
    }

    #[async_trait]
    impl ProcessController for CountingController {
        async fn start_process(
            &self,
            _host_id: &str,
            _role: &str,
            _params: &HashMap<String, String>,
        ) -> Result<StartOutcome, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.notify.notify_one();
            Ok(StartOutcome::Started { pid: Some(42) })
        }

        async fn stop_process(&self, _host_id: &str) -> Result<(), Error> {
            Ok(())
        }
    }

    fn fast_restart_config() -> RestartConfig {
        RestartConfig {
            enabled: true,
            restart_delay: Duration::from_millis(1),
            max_restarts: 3,
            time_window: Duration::from_secs(300),
            cooldown_period: Duration::from_secs(1800),
        }
    }

    #[tokio::test]
    async fn crash_triggers_a_restart() {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let controller = Arc::new(CountingController { calls: AtomicU32::new(0), notify: Notify::new() });
        let sup = ProcessSupervisor::new(events, controller.clone(), Arc::new(NoopRestartCallback), fast_restart_config());

        sup.start("host-1", "worker", HashMap::new()).await.unwrap();
        sup.notify_crash("host-1").unwrap();
        controller.notify.notified().await;

        assert_eq!(controller.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn manually_stopped_process_does_not_restart() {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let controller = Arc::new(CountingController { calls: AtomicU32::new(0), notify: Notify::new() });
        let sup = ProcessSupervisor::new(events, controller.clone(), Arc::new(NoopRestartCallback), fast_restart_config());

        sup.start("host-1", "worker", HashMap::new()).await.unwrap();
        sup.stop("host-1").await.unwrap();
        sup.notify_crash("host-1").unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(controller.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_host_crash_is_not_tracked() {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let controller = Arc::new(CountingController { calls: AtomicU32::new(0), notify: Notify::new() });
        let sup = ProcessSupervisor::new(events, controller, Arc::new(NoopRestartCallback), fast_restart_config());

        let err = sup.notify_crash("ghost").unwrap_err();
        assert!(matches!(err, Error::Supervisor(SupervisorError::NotTracked { .. })));
    }
}
