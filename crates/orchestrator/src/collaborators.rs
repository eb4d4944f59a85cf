//! Collaborator interfaces the orchestrator depends on but does not own
//! (§6.2)
//!
//! The real Controller sits behind a REST/auth/DB layer that is out of
//! scope here; each interface it exposes to the installation engine is
//! expressed as a trait with a harmless default implementation, so the
//! orchestrator compiles and runs standalone in tests and the `apps/
//! controller` binary without a real HTTP/DB stack behind it.

use async_trait::async_trait;
use fleet_errors::Error;

/// Resolves a `host_id` to its connected Agent, backed in practice by
/// [`fleet_registry::AgentRegistry`].
#[async_trait]
pub trait HostProvider: Send + Sync {
    async fn resolve_agent(&self, host_id: &str) -> Option<(String, bool)>;
}

#[async_trait]
impl HostProvider for fleet_registry::AgentRegistry {
    async fn resolve_agent(&self, host_id: &str) -> Option<(String, bool)> {
        self.get_by_host(host_id)
    }
}

/// Starts the engine process on a host once installation completes.
#[async_trait]
pub trait NodeStarter: Send + Sync {
    async fn start(&self, cluster_id: &str, host_id: &str) -> Result<(bool, String), Error>;
}

pub struct NoopNodeStarter;

#[async_trait]
impl NodeStarter for NoopNodeStarter {
    async fn start(&self, _cluster_id: &str, _host_id: &str) -> Result<(bool, String), Error> {
        Ok((true, "no-op start".to_string()))
    }
}

/// Propagates a node's health back to the Controller's external view.
#[async_trait]
pub trait NodeStatusUpdater: Send + Sync {
    async fn update_status(&self, cluster_id: &str, host_id: &str, status: &str);
}

pub struct NoopNodeStatusUpdater;

#[async_trait]
impl NodeStatusUpdater for NoopNodeStatusUpdater {
    async fn update_status(&self, _cluster_id: &str, _host_id: &str, _status: &str) {}
}

/// Delivers a plugin artifact to an Agent (§4.10's chunked push, from
/// the orchestrator's point of view as a black box).
#[async_trait]
pub trait PluginTransferer: Send + Sync {
    async fn transfer(
        &self,
        agent_id: &str,
        plugin_name: &str,
        version: &str,
        install_dir: &str,
    ) -> Result<(), Error>;
}

pub struct NoopPluginTransferer;

#[async_trait]
impl PluginTransferer for NoopPluginTransferer {
    async fn transfer(
        &self,
        _agent_id: &str,
        _plugin_name: &str,
        _version: &str,
        _install_dir: &str,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Initializes cluster-scoped configuration ahead of node startup.
#[async_trait]
pub trait ConfigInitializer: Send + Sync {
    async fn init_cluster_configs(
        &self,
        cluster_id: &str,
        host_id: &str,
        install_dir: &str,
        user_id: &str,
    ) -> Result<(), Error>;
}

pub struct NoopConfigInitializer;

#[async_trait]
impl ConfigInitializer for NoopConfigInitializer {
    async fn init_cluster_configs(
        &self,
        _cluster_id: &str,
        _host_id: &str,
        _install_dir: &str,
        _user_id: &str,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Records a successfully installed plugin against a cluster, per
/// §4.7's call into `PluginCatalog.RecordInstalled`. Duplicate calls
/// for the same `(cluster_id, plugin)` pair are tolerated.
#[async_trait]
pub trait PluginRecorder: Send + Sync {
    async fn record_installed(&self, cluster_id: &str, plugin: &str);
}

pub struct NoopPluginRecorder;

#[async_trait]
impl PluginRecorder for NoopPluginRecorder {
    async fn record_installed(&self, _cluster_id: &str, _plugin: &str) {}
}
