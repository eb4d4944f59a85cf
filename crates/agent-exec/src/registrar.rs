//! Agent-side notification that a node is ready (§4.8 `register_cluster`)
//!
//! The wire protocol (§6.1) carries no dedicated "node ready" message
//! type, so this is expressed the same way the orchestrator expresses
//! its own out-of-scope collaborators: a trait with a harmless default,
//! ready to be backed by a real outbound call once one exists.

use async_trait::async_trait;

#[async_trait]
pub trait ClusterRegistrar: Send + Sync {
    async fn register(&self, cluster_id: &str, host_id: &str);
}

pub struct NoopClusterRegistrar;

#[async_trait]
impl ClusterRegistrar for NoopClusterRegistrar {
    async fn register(&self, _cluster_id: &str, _host_id: &str) {}
}
