//! Real collaborator adapters wiring the orchestrator's out-of-band
//! interfaces onto this binary's registry/transport/catalog, in the
//! style of `fleet-orchestrator::collaborators`'s own doc comment: a
//! REST/auth/DB layer is out of scope, so only the two interfaces that
//! genuinely have an Agent-side counterpart (starting a node, pushing a
//! plugin) get a real implementation here. `ConfigInitializer` and
//! `NodeStatusUpdater` stay `Noop*`, per the same scoping.

use async_trait::async_trait;
use fleet_errors::Error;
use fleet_orchestrator::{NodeStarter, PluginRecorder, PluginTransferer};
use fleet_plugin::PluginCatalog;
use fleet_registry::AgentRegistry;
use fleet_transport::CommandTransport;
use fleet_types::{CommandStatus, CommandType};
use std::collections::HashMap;
use std::sync::Arc;

pub struct TransportNodeStarter {
    registry: Arc<AgentRegistry>,
    transport: Arc<CommandTransport>,
    install_dir: String,
    command_timeout_s: u64,
}

impl TransportNodeStarter {
    #[must_use]
    pub fn new(
        registry: Arc<AgentRegistry>,
        transport: Arc<CommandTransport>,
        install_dir: impl Into<String>,
        command_timeout_s: u64,
    ) -> Self {
        Self {
            registry,
            transport,
            install_dir: install_dir.into(),
            command_timeout_s,
        }
    }
}

#[async_trait]
impl NodeStarter for TransportNodeStarter {
    async fn start(&self, cluster_id: &str, host_id: &str) -> Result<(bool, String), Error> {
        let Some((Some(agent_id), true)) = self.registry.get_by_host(host_id) else {
            return Ok((false, format!("host {host_id} has no connected agent")));
        };

        let mut params = HashMap::new();
        params.insert("cluster_id".to_string(), cluster_id.to_string());
        params.insert("install_dir".to_string(), self.install_dir.clone());

        let response = self
            .transport
            .send_sync(&agent_id, CommandType::Start, params, self.command_timeout_s)
            .await?;

        Ok(match response.status {
            CommandStatus::Success => (true, response.output),
            _ => (false, response.error.unwrap_or(response.output)),
        })
    }
}

pub struct CatalogPluginTransferer {
    catalog: Arc<PluginCatalog>,
    transport: Arc<CommandTransport>,
    repo: Option<String>,
}

impl CatalogPluginTransferer {
    #[must_use]
    pub fn new(catalog: Arc<PluginCatalog>, transport: Arc<CommandTransport>, repo: Option<String>) -> Self {
        Self { catalog, transport, repo }
    }
}

#[async_trait]
impl PluginTransferer for CatalogPluginTransferer {
    async fn transfer(
        &self,
        agent_id: &str,
        plugin_name: &str,
        version: &str,
        install_dir: &str,
    ) -> Result<(), Error> {
        fleet_plugin::deliver_plugin(
            &self.catalog,
            &self.transport,
            agent_id,
            plugin_name,
            version,
            install_dir,
            self.repo.as_deref(),
        )
        .await
    }
}

pub struct CatalogPluginRecorder {
    catalog: Arc<PluginCatalog>,
}

impl CatalogPluginRecorder {
    #[must_use]
    pub fn new(catalog: Arc<PluginCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PluginRecorder for CatalogPluginRecorder {
    async fn record_installed(&self, cluster_id: &str, plugin: &str) {
        self.catalog.record_installed(cluster_id, plugin);
    }
}
