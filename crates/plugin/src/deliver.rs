//! Ties the catalog's download step to the chunked transport push and
//! the Agent-side `install_plugin` command (§4.10)

use crate::catalog::PluginCatalog;
use crate::transfer::{PluginChunkSink, PluginFileType};
use fleet_errors::Error;
use fleet_transport::CommandTransport;
use fleet_types::CommandType;
use std::collections::HashMap;
use std::sync::Arc;

/// Timeout for both the chunked push and the final install command.
pub const PLUGIN_COMMAND_TIMEOUT_S: u64 = 600;

/// Downloads `plugin_name` into the Controller cache if needed, pushes
/// it to `agent_id` in chunks, then tells the Agent to place it under
/// `install_dir`. Does not record the install; callers decide when a
/// plugin is considered installed for a cluster.
///
/// # Errors
/// Returns whatever `ensure_downloaded`, the chunk transfer, or the
/// final `install_plugin` command returns.
pub async fn deliver_plugin(
    catalog: &PluginCatalog,
    transport: &Arc<CommandTransport>,
    agent_id: &str,
    plugin_name: &str,
    version: &str,
    install_dir: &str,
    repo: Option<&str>,
) -> Result<(), Error> {
    let path = catalog.ensure_downloaded(plugin_name, version, repo).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{plugin_name}-{version}.jar"));

    let sink = PluginChunkSink::new(
        Arc::clone(transport),
        agent_id,
        plugin_name,
        PluginFileType::Connector,
        PLUGIN_COMMAND_TIMEOUT_S,
    );
    fleet_transfer::send_file(&sink, &path, version, &filename).await?;

    let mut params = HashMap::new();
    params.insert("plugin_name".to_string(), plugin_name.to_string());
    params.insert("version".to_string(), version.to_string());
    params.insert("install_dir".to_string(), install_dir.to_string());
    transport
        .send_sync(agent_id, CommandType::InstallPlugin, params, PLUGIN_COMMAND_TIMEOUT_S)
        .await?;

    Ok(())
}
