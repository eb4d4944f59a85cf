//! Real `ProcessController` backing `fleet-supervisor` on the Agent:
//! spawns the engine's cluster launcher as a child process and feeds
//! its exit back into [`ProcessSupervisor::notify_crash`] so the
//! restart-on-crash loop actually has something to react to.

use async_trait::async_trait;
use dashmap::DashMap;
use fleet_errors::Error;
use fleet_supervisor::{ProcessController, ProcessSupervisor, StartOutcome};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, Weak};
use tokio::process::Command;
use tokio::sync::oneshot;

const CLUSTER_LAUNCHER: &str = "bin/seatunnel-cluster.sh";

pub struct OsProcessController {
    stop_senders: Arc<DashMap<String, oneshot::Sender<()>>>,
    supervisor: Arc<OnceLock<Weak<ProcessSupervisor>>>,
}

impl OsProcessController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stop_senders: Arc::new(DashMap::new()),
            supervisor: Arc::new(OnceLock::new()),
        }
    }

    /// Wires the supervisor this controller reports crashes back to.
    /// Called once after both are constructed; `ProcessSupervisor::new`
    /// needs an `Arc<dyn ProcessController>` before a supervisor handle
    /// exists to hand back, so the link is completed in a second step.
    pub fn bind_supervisor(&self, supervisor: &Arc<ProcessSupervisor>) {
        let _ = self.supervisor.set(Arc::downgrade(supervisor));
    }
}

impl Default for OsProcessController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessController for OsProcessController {
    async fn start_process(
        &self,
        host_id: &str,
        _role: &str,
        params: &HashMap<String, String>,
    ) -> Result<StartOutcome, Error> {
        if self.stop_senders.contains_key(host_id) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let install_dir = params
            .get("install_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/opt/seatunnel"));
        let launcher = install_dir.join(CLUSTER_LAUNCHER);

        let mut child = Command::new(&launcher)
            .arg("-d")
            .current_dir(&install_dir)
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| Error::io_with_path(&e, &launcher))?;
        let pid = child.id();

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_senders.insert(host_id.to_string(), stop_tx);

        let host_id = host_id.to_string();
        let stop_senders = Arc::clone(&self.stop_senders);
        let supervisor = Arc::clone(&self.supervisor);
        tokio::spawn(async move {
            tokio::select! {
                _ = child.wait() => {
                    stop_senders.remove(&host_id);
                    if let Some(sup) = supervisor.get().and_then(Weak::upgrade) {
                        let _ = sup.notify_crash(&host_id);
                    }
                }
                _ = &mut stop_rx => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                }
            }
        });

        Ok(StartOutcome::Started { pid })
    }

    async fn stop_process(&self, host_id: &str) -> Result<(), Error> {
        if let Some((_, tx)) = self.stop_senders.remove(host_id) {
            let _ = tx.send(());
        }
        Ok(())
    }
}
