//! Installation orchestrator state machine (§4.6)

use crate::collaborators::{
    ConfigInitializer, HostProvider, NodeStarter, NodeStatusUpdater, PluginRecorder,
    PluginTransferer,
};
use crate::transfer_bridge::TransportChunkSink;
use crate::validate::validate;
use chrono::Utc;
use dashmap::DashMap;
use fleet_cache::PackageCache;
use fleet_errors::{Error, InstallError};
use fleet_events::{EventEmitter, EventSender, InstallEvent};
use fleet_net::MirrorDownloader;
use fleet_transport::CommandTransport;
use fleet_types::{
    CommandResponse, CommandStatus, CommandType, InstallStep, InstallationRequest,
    InstallationState, InstallationStatus, MirrorId, StepStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Cadence at which the orchestrator polls a running installation's
/// command status.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wall-clock budget for the single `install` command itself; distinct
/// from any individual chunk or precheck timeout.
const INSTALL_COMMAND_TIMEOUT_S: u64 = 3600;

struct Entry {
    status: Arc<Mutex<InstallationStatus>>,
    cancelled: Arc<AtomicBool>,
}

pub struct InstallationOrchestrator {
    engine: String,
    installations: DashMap<String, Entry>,
    events: EventSender,
    host_provider: Arc<dyn HostProvider>,
    transport: Arc<CommandTransport>,
    downloader: Arc<MirrorDownloader>,
    cache: Arc<PackageCache>,
    node_starter: Arc<dyn NodeStarter>,
    node_status_updater: Arc<dyn NodeStatusUpdater>,
    plugin_transferer: Arc<dyn PluginTransferer>,
    config_initializer: Arc<dyn ConfigInitializer>,
    plugin_recorder: Arc<dyn PluginRecorder>,
}

#[allow(clippy::too_many_arguments)]
impl InstallationOrchestrator {
    #[must_use]
    pub fn new(
        engine: impl Into<String>,
        events: EventSender,
        host_provider: Arc<dyn HostProvider>,
        transport: Arc<CommandTransport>,
        downloader: Arc<MirrorDownloader>,
        cache: Arc<PackageCache>,
        node_starter: Arc<dyn NodeStarter>,
        node_status_updater: Arc<dyn NodeStatusUpdater>,
        plugin_transferer: Arc<dyn PluginTransferer>,
        config_initializer: Arc<dyn ConfigInitializer>,
        plugin_recorder: Arc<dyn PluginRecorder>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine: engine.into(),
            installations: DashMap::new(),
            events,
            host_provider,
            transport,
            downloader,
            cache,
            node_starter,
            node_status_updater,
            plugin_transferer,
            config_initializer,
            plugin_recorder,
        })
    }

    /// Validates and accepts a new installation request, spawning its
    /// driver task and returning immediately with the installation id.
    ///
    /// # Errors
    /// Returns `InstallError::InvalidRequest` if validation fails,
    /// `InstallError::AlreadyInProgress` if `req.host_id` already has a
    /// running installation, or `InstallError::AgentNotConnected` if
    /// the registry has no live Agent for the host.
    pub async fn start_installation(
        self: &Arc<Self>,
        req: InstallationRequest,
    ) -> Result<String, Error> {
        validate(&req)?;

        if let Some(entry) = self.installations.get(&req.host_id) {
            let status = entry.status.lock().await;
            if status.status == InstallationState::Running {
                return Err(InstallError::AlreadyInProgress {
                    host_id: req.host_id.clone(),
                }
                .into());
            }
        }

        let Some((agent_id, connected)) = self.host_provider.resolve_agent(&req.host_id).await
        else {
            return Err(InstallError::AgentNotConnected {
                host_id: req.host_id.clone(),
            }
            .into());
        };
        if !connected {
            return Err(InstallError::AgentNotConnected {
                host_id: req.host_id.clone(),
            }
            .into());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut status = InstallationStatus::new(id.clone(), req.host_id.clone());
        status.status = InstallationState::Running;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.installations.insert(
            req.host_id.clone(),
            Entry {
                status: Arc::new(Mutex::new(status)),
                cancelled: Arc::clone(&cancelled),
            },
        );

        self.events.emit_install(InstallEvent::Started {
            installation_id: id.clone(),
            host_id: req.host_id.clone(),
        });

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.drive_installation(req, agent_id, cancelled).await;
        });

        Ok(id)
    }

    /// Returns a clone of the current status for `host_id`, if an
    /// installation has ever been started for it.
    pub async fn get_status(&self, host_id: &str) -> Option<InstallationStatus> {
        let entry = self.installations.get(host_id)?;
        Some(entry.status.lock().await.clone())
    }

    /// Marks the installation `failed` with a "cancelled" message.
    /// In-flight remote work is not guaranteed to stop.
    ///
    /// # Errors
    /// Returns `InstallError::NotFound` if no installation exists for
    /// `host_id`.
    pub async fn cancel_installation(&self, host_id: &str) -> Result<(), Error> {
        let entry = self
            .installations
            .get(host_id)
            .ok_or_else(|| InstallError::NotFound {
                host_id: host_id.to_string(),
            })?;
        entry.cancelled.store(true, Ordering::SeqCst);

        let mut status = entry.status.lock().await;
        if status.status == InstallationState::Running {
            status.status = InstallationState::Failed;
            status.error = Some("cancelled".to_string());
            status.message = Some("cancelled".to_string());
            status.end_time = Some(Utc::now());
            self.events.emit_install(InstallEvent::Cancelled {
                installation_id: status.id.clone(),
            });
        }
        Ok(())
    }

    /// Resets `step` to `pending`, clears any error, and resumes the
    /// installation by reissuing the `install` command with a
    /// `resume_from_step` parameter. The Agent's executor re-runs each
    /// step idempotently rather than replaying from scratch.
    ///
    /// # Errors
    /// Returns `InstallError::NotFound` if no installation exists for
    /// `host_id`, or `InstallError::StepNotRetryable` for the terminal
    /// `complete` step.
    pub async fn execute_step(
        self: &Arc<Self>,
        host_id: &str,
        step: InstallStep,
    ) -> Result<(), Error> {
        if !step.is_retryable() {
            return Err(InstallError::StepNotRetryable {
                step: step.name().to_string(),
            }
            .into());
        }

        let Some((agent_id, _)) = self.host_provider.resolve_agent(host_id).await else {
            return Err(InstallError::AgentNotConnected {
                host_id: host_id.to_string(),
            }
            .into());
        };

        let cancelled = {
            let entry = self
                .installations
                .get(host_id)
                .ok_or_else(|| InstallError::NotFound {
                    host_id: host_id.to_string(),
                })?;
            let mut status = entry.status.lock().await;
            status.step_mut(step).status = StepStatus::Pending;
            status.step_mut(step).error = None;
            status.error = None;
            status.status = InstallationState::Running;
            entry.cancelled.store(false, Ordering::SeqCst);
            Arc::clone(&entry.cancelled)
        };

        let mut params = HashMap::new();
        params.insert("resume_from_step".to_string(), step.name().to_string());

        let command_id = self
            .transport
            .send_async(&agent_id, CommandType::Install, params, INSTALL_COMMAND_TIMEOUT_S)
            .await?;

        let this = Arc::clone(self);
        let host_id = host_id.to_string();
        tokio::spawn(async move {
            this.poll_until_terminal(&host_id, &command_id, cancelled).await;
        });

        Ok(())
    }

    async fn drive_installation(
        self: Arc<Self>,
        req: InstallationRequest,
        agent_id: String,
        cancelled: Arc<AtomicBool>,
    ) {
        if let Err(e) = self.ensure_package_cached(&req).await {
            self.fail(&req.host_id, &e).await;
            return;
        }

        if let Err(e) = self.transfer_package(&req, &agent_id).await {
            // Transfer failure falls back to Agent-side mirror download,
            // signalled to the Agent via the `package_path` param being
            // absent from the install command below.
            tracing::warn!(host_id = %req.host_id, error = %e, "package transfer failed, falling back to agent-side mirror fetch");
        }

        if req.connectors.install {
            if let Err(e) = self.transfer_plugins(&req, &agent_id).await {
                self.fail(&req.host_id, &e).await;
                return;
            }
        }

        let mut params = req.to_param_map();
        if let Some(local_path) = self.cache.path_for(&req.version).to_str() {
            params.insert("package_path".to_string(), local_path.to_string());
        }

        let command_id = match self
            .transport
            .send_async(&agent_id, CommandType::Install, params, INSTALL_COMMAND_TIMEOUT_S)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.fail(&req.host_id, &e).await;
                return;
            }
        };

        self.poll_until_terminal(&req.host_id, &command_id, cancelled).await;

        if self.installation_succeeded(&req.host_id).await {
            self.run_post_install(&req).await;
        }
    }

    /// Ensures the package is present in the shared cache directory
    /// before transfer, downloading it from a mirror first if needed.
    /// `downloader` and `cache` are wired to the same cache directory,
    /// so a completed download is immediately visible to `cache`.
    async fn ensure_package_cached(&self, req: &InstallationRequest) -> Result<(), Error> {
        use fleet_types::InstallMode;
        if req.install_mode != InstallMode::Online {
            return Ok(());
        }
        if self.cache.contains(&req.version).await {
            return Ok(());
        }
        let mirror = req.mirror.unwrap_or(MirrorId::recommended());
        let task = self.downloader.download(&req.version, mirror).await?;
        if task.status != fleet_net::DownloadStatus::Completed {
            return Err(InstallError::Remote {
                message: format!("download for {} ended as {:?}", req.version, task.status),
            }
            .into());
        }
        Ok(())
    }

    async fn transfer_package(&self, req: &InstallationRequest, agent_id: &str) -> Result<(), Error> {
        let path = self.cache.path_for(&req.version);
        let filename = fleet_types::Package::filename_for(&self.engine, &req.version);
        let sink = TransportChunkSink::new(
            Arc::clone(&self.transport),
            agent_id,
            CommandType::TransferPackage,
            300,
        );
        fleet_transfer::send_file(&sink, &path, &req.version, &filename).await
    }

    /// §4.6 step 5: push every selected connector to the Agent before
    /// the `install` command runs, since the Agent's own
    /// `install_plugins` step only verifies a jar already sitting under
    /// `connectors/` rather than placing one there itself.
    async fn transfer_plugins(&self, req: &InstallationRequest, agent_id: &str) -> Result<(), Error> {
        for plugin in &req.connectors.selected {
            self.plugin_transferer
                .transfer(agent_id, plugin, &req.version, "/opt/seatunnel")
                .await?;
        }
        Ok(())
    }

    async fn poll_until_terminal(
        &self,
        host_id: &str,
        command_id: &str,
        cancelled: Arc<AtomicBool>,
    ) {
        loop {
            if cancelled.load(Ordering::SeqCst) {
                return;
            }

            let response = match self.transport.get_status(command_id) {
                Ok(r) => r,
                Err(_) => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    continue;
                }
            };

            self.apply_response(host_id, &response).await;

            if response.status != CommandStatus::Running {
                return;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn apply_response(&self, host_id: &str, response: &CommandResponse) {
        let Some(entry) = self.installations.get(host_id) else {
            return;
        };
        let mut status = entry.status.lock().await;

        if let Some((step_name, rest)) = CommandResponse::parse_step_prefix(&response.output) {
            if let Some(step) = InstallStep::from_name(step_name) {
                for earlier in InstallStep::ORDER.into_iter().filter(|s| s.index() < step.index()) {
                    let info = status.step_mut(earlier);
                    if info.status != StepStatus::Success {
                        info.status = StepStatus::Success;
                        info.progress = 100;
                        info.end_time = Some(Utc::now());
                    }
                }
                status.current_step = step;
                let info = status.step_mut(step);
                if info.start_time.is_none() {
                    info.start_time = Some(Utc::now());
                }
                info.status = StepStatus::Running;
                info.message = Some(rest.to_string());
                info.progress = response.progress;
                status.overall_progress = response.progress;
                let installation_id = status.id.clone();
                drop(status);
                self.events.emit_install(InstallEvent::StepProgress {
                    installation_id,
                    step,
                    progress: response.progress,
                    message: rest.to_string(),
                });
                return;
            }
        }

        match response.status {
            CommandStatus::Running => {
                status.overall_progress = response.progress;
            }
            CommandStatus::Success => {
                for step in InstallStep::ORDER {
                    let info = status.step_mut(step);
                    info.status = StepStatus::Success;
                    info.progress = 100;
                }
                status.overall_progress = 100;
                status.status = InstallationState::Success;
                status.end_time = Some(Utc::now());
                let installation_id = status.id.clone();
                drop(status);
                self.events.emit_install(InstallEvent::Completed { installation_id });
            }
            CommandStatus::Failed => {
                status.status = InstallationState::Failed;
                status.error = response.error.clone();
                status.message = response.error.clone();
                status.end_time = Some(Utc::now());
                let installation_id = status.id.clone();
                let error = response.error.clone().unwrap_or_default();
                drop(status);
                self.events.emit_install(InstallEvent::Failed { installation_id, error });
            }
        }
    }

    async fn installation_succeeded(&self, host_id: &str) -> bool {
        let Some(entry) = self.installations.get(host_id) else {
            return false;
        };
        entry.status.lock().await.status == InstallationState::Success
    }

    /// Pushes and installs one additional connector plugin onto an
    /// already-installed host, outside the initial `install_plugins`
    /// step. Used by the plugin catalog to expand a running node's
    /// connector set.
    ///
    /// # Errors
    /// Returns `InstallError::AgentNotConnected` if the host has no
    /// live Agent, or whatever [`PluginTransferer::transfer`] returns.
    pub async fn install_plugin(
        &self,
        host_id: &str,
        cluster_id: &str,
        plugin_name: &str,
        version: &str,
        install_dir: &str,
    ) -> Result<(), Error> {
        let Some((agent_id, true)) = self.host_provider.resolve_agent(host_id).await else {
            return Err(InstallError::AgentNotConnected {
                host_id: host_id.to_string(),
            }
            .into());
        };
        self.plugin_transferer
            .transfer(&agent_id, plugin_name, version, install_dir)
            .await?;
        self.plugin_recorder.record_installed(cluster_id, plugin_name).await;
        Ok(())
    }

    /// §4.7: initialize cluster configs, start the node, then
    /// best-effort propagate status and record installed plugins.
    /// Startup failures do not change the installation's terminal
    /// `success` state.
    async fn run_post_install(&self, req: &InstallationRequest) {
        if let Err(e) = self
            .config_initializer
            .init_cluster_configs(&req.cluster_id, &req.host_id, "/opt/seatunnel", "system")
            .await
        {
            self.append_final_message(&req.host_id, &format!("config init failed: {e}"))
                .await;
        }

        match self.node_starter.start(&req.cluster_id, &req.host_id).await {
            Ok((true, _)) => {
                self.node_status_updater
                    .update_status(&req.cluster_id, &req.host_id, "running")
                    .await;
                for plugin in &req.connectors.selected {
                    self.plugin_recorder.record_installed(&req.cluster_id, plugin).await;
                }
            }
            Ok((false, message)) | Err(Error::Install(InstallError::Remote { message })) => {
                self.append_final_message(&req.host_id, &format!("startup failed: {message}"))
                    .await;
            }
            Err(e) => {
                self.append_final_message(&req.host_id, &format!("startup failed: {e}"))
                    .await;
            }
        }
    }

    async fn append_final_message(&self, host_id: &str, note: &str) {
        if let Some(entry) = self.installations.get(host_id) {
            let mut status = entry.status.lock().await;
            status.message = Some(match status.message.take() {
                Some(existing) => format!("{existing}; {note}"),
                None => note.to_string(),
            });
        }
    }

    async fn fail(&self, host_id: &str, error: &Error) {
        if let Some(entry) = self.installations.get(host_id) {
            let mut status = entry.status.lock().await;
            status.status = InstallationState::Failed;
            status.error = Some(error.to_string());
            status.end_time = Some(Utc::now());
            let installation_id = status.id.clone();
            drop(status);
            self.events.emit_install(InstallEvent::Failed {
                installation_id,
                error: error.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        NoopConfigInitializer, NoopNodeStarter, NoopNodeStatusUpdater, NoopPluginRecorder,
        NoopPluginTransferer,
    };
    use fleet_transport::InProcessChannel;
    use fleet_types::{CheckpointConfig, ConnectorsConfig, DeploymentMode, InstallMode, JvmConfig, NodeRole};
    use std::sync::Mutex as StdMutex;

    struct AlwaysConnected;

    /// Records every `transfer` call instead of doing anything, so tests
    /// can assert §4.6 step 5 actually ran.
    #[derive(Default)]
    struct RecordingPluginTransferer {
        calls: StdMutex<Vec<(String, String, String, String)>>,
    }

    impl RecordingPluginTransferer {
        fn calls(&self) -> Vec<(String, String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PluginTransferer for RecordingPluginTransferer {
        async fn transfer(
            &self,
            agent_id: &str,
            plugin_name: &str,
            version: &str,
            install_dir: &str,
        ) -> Result<(), Error> {
            self.calls.lock().unwrap().push((
                agent_id.to_string(),
                plugin_name.to_string(),
                version.to_string(),
                install_dir.to_string(),
            ));
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl HostProvider for AlwaysConnected {
        async fn resolve_agent(&self, _host_id: &str) -> Option<(String, bool)> {
            Some(("agent-1".to_string(), true))
        }
    }

    fn sample_request(host_id: &str) -> InstallationRequest {
        InstallationRequest {
            host_id: host_id.to_string(),
            cluster_id: "cluster-1".to_string(),
            version: "2.3.12".to_string(),
            install_mode: InstallMode::Offline,
            mirror: None,
            package_path: None,
            expected_checksum: None,
            deployment_mode: DeploymentMode::Hybrid,
            node_role: NodeRole::Master,
            master_addrs: vec!["10.0.0.1".to_string()],
            worker_addrs: vec![],
            cluster_port: 5801,
            worker_port: None,
            http_port: 8080,
            dynamic_slot: None,
            jvm: JvmConfig::default(),
            checkpoint: CheckpointConfig::default(),
            connectors: ConnectorsConfig::default(),
        }
    }

    /// Same as [`sample_request`] but with a non-empty connector
    /// selection, so tests can exercise §4.6 step 5.
    fn sample_request_with_connectors(host_id: &str, selected: &[&str]) -> InstallationRequest {
        InstallationRequest {
            connectors: ConnectorsConfig {
                install: true,
                selected: selected.iter().map(|s| s.to_string()).collect(),
                repo: None,
            },
            ..sample_request(host_id)
        }
    }

    /// Builds an orchestrator wired to an echo channel that replies
    /// `success` to every dispatched command, plus a package cache
    /// directory under `dir`.
    fn echoing_orchestrator(dir: &std::path::Path) -> Arc<InstallationOrchestrator> {
        echoing_orchestrator_with_transferer(dir, Arc::new(NoopPluginTransferer))
    }

    /// Same as [`echoing_orchestrator`] but with a caller-supplied
    /// `PluginTransferer`, so tests can observe plugin-transfer calls.
    fn echoing_orchestrator_with_transferer(
        dir: &std::path::Path,
        plugin_transferer: Arc<dyn PluginTransferer>,
    ) -> Arc<InstallationOrchestrator> {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let transport = Arc::new(CommandTransport::new());
        let (channel, mut requests) = InProcessChannel::pair();
        let transport_for_reader = Arc::clone(&transport);
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                transport_for_reader
                    .handle_response(CommandResponse::success(request.command_id, "ok"));
            }
        });
        transport.register_channel("agent-1", Arc::new(channel));

        let (dl_events, mut dl_rx) = fleet_events::channel();
        tokio::spawn(async move { while dl_rx.recv().await.is_some() {} });

        InstallationOrchestrator::new(
            "seatunnel",
            events,
            Arc::new(AlwaysConnected),
            transport,
            Arc::new(MirrorDownloader::new("seatunnel", dir, dl_events)),
            Arc::new(PackageCache::new("seatunnel", dir)),
            Arc::new(NoopNodeStarter),
            Arc::new(NoopNodeStatusUpdater),
            plugin_transferer,
            Arc::new(NoopConfigInitializer),
            Arc::new(NoopPluginRecorder),
        )
    }

    /// Same as [`echoing_orchestrator`] but the registered channel
    /// never replies, so any installation it drives stays `Running`.
    fn silent_orchestrator(dir: &std::path::Path) -> Arc<InstallationOrchestrator> {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let transport = Arc::new(CommandTransport::new());
        let (channel, _requests) = InProcessChannel::pair();
        transport.register_channel("agent-1", Arc::new(channel));

        let (dl_events, mut dl_rx) = fleet_events::channel();
        tokio::spawn(async move { while dl_rx.recv().await.is_some() {} });

        InstallationOrchestrator::new(
            "seatunnel",
            events,
            Arc::new(AlwaysConnected),
            transport,
            Arc::new(MirrorDownloader::new("seatunnel", dir, dl_events)),
            Arc::new(PackageCache::new("seatunnel", dir)),
            Arc::new(NoopNodeStarter),
            Arc::new(NoopNodeStatusUpdater),
            Arc::new(NoopPluginTransferer),
            Arc::new(NoopConfigInitializer),
            Arc::new(NoopPluginRecorder),
        )
    }

    #[tokio::test]
    async fn start_installation_reaches_success_on_echoed_command() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = echoing_orchestrator(dir.path());

        let id = orchestrator
            .start_installation(sample_request("host-1"))
            .await
            .unwrap();
        assert!(!id.is_empty());

        for _ in 0..50 {
            if let Some(status) = orchestrator.get_status("host-1").await {
                if status.status == InstallationState::Success {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("installation never reached success");
    }

    #[tokio::test]
    async fn second_start_while_running_is_already_in_progress() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = silent_orchestrator(dir.path());

        orchestrator
            .start_installation(sample_request("host-2"))
            .await
            .unwrap();
        let err = orchestrator
            .start_installation(sample_request("host-2"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::AlreadyInProgress { .. })
        ));
    }

    #[tokio::test]
    async fn cancel_unknown_host_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = echoing_orchestrator(dir.path());
        let err = orchestrator.cancel_installation("ghost").await.unwrap_err();
        assert!(matches!(err, Error::Install(InstallError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_running_installation_marks_failed() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = silent_orchestrator(dir.path());

        orchestrator
            .start_installation(sample_request("host-3"))
            .await
            .unwrap();
        orchestrator.cancel_installation("host-3").await.unwrap();

        let status = orchestrator.get_status("host-3").await.unwrap();
        assert_eq!(status.status, InstallationState::Failed);
    }

    #[tokio::test]
    async fn drive_installation_transfers_selected_connectors_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let transferer = Arc::new(RecordingPluginTransferer::default());
        let orchestrator = echoing_orchestrator_with_transferer(dir.path(), Arc::clone(&transferer) as Arc<dyn PluginTransferer>);

        let id = orchestrator
            .start_installation(sample_request_with_connectors("host-4", &["jdbc", "kafka"]))
            .await
            .unwrap();
        assert!(!id.is_empty());

        for _ in 0..50 {
            if let Some(status) = orchestrator.get_status("host-4").await {
                if status.status == InstallationState::Success {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let calls = transferer.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("agent-1".to_string(), "jdbc".to_string(), "2.3.12".to_string(), "/opt/seatunnel".to_string()));
        assert_eq!(calls[1].1, "kafka");
    }
}
