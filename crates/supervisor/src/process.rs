//! Collaborator interfaces the supervisor depends on but does not own
//! (§6.2, via Agent `StartProcess`/`StopProcess` commands)

use async_trait::async_trait;
use fleet_errors::Error;
use std::collections::HashMap;

/// Outcome of a `StartProcess` attempt. `AlreadyRunning` is treated the
/// same as a fresh start by the caller, per §4.9.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { pid: Option<u32> },
    AlreadyRunning,
}

#[async_trait]
pub trait ProcessController: Send + Sync {
    async fn start_process(
        &self,
        host_id: &str,
        role: &str,
        params: &HashMap<String, String>,
    ) -> Result<StartOutcome, Error>;

    async fn stop_process(&self, host_id: &str) -> Result<(), Error>;
}

pub struct NoopProcessController;

#[async_trait]
impl ProcessController for NoopProcessController {
    async fn start_process(
        &self,
        _host_id: &str,
        _role: &str,
        _params: &HashMap<String, String>,
    ) -> Result<StartOutcome, Error> {
        Ok(StartOutcome::Started { pid: None })
    }

    async fn stop_process(&self, _host_id: &str) -> Result<(), Error> {
        Ok(())
    }
}

/// Notified out-of-core after every restart attempt, invoked without
/// any supervisor lock held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    Started { pid: Option<u32> },
    AlreadyRunning,
    Denied { reason: String },
    Disabled,
    Failed { message: String },
}

#[async_trait]
pub trait RestartCallback: Send + Sync {
    async fn on_restart(&self, host_id: &str, outcome: &RestartOutcome);
}

pub struct NoopRestartCallback;

#[async_trait]
impl RestartCallback for NoopRestartCallback {
    async fn on_restart(&self, _host_id: &str, _outcome: &RestartOutcome) {}
}
