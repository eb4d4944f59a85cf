//! Translates an inbound [`CommandRequest`] into a call against the
//! Agent's local components, and the result back into a
//! [`CommandResponse`] (or a stream of them, for long-running install
//! commands).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use fleet_agent_exec::{resolve_artifact_id, InstallParams, StepExecutor};
use fleet_errors::Error;
use fleet_precheck::PrecheckConfig;
use fleet_supervisor::ProcessSupervisor;
use fleet_transfer::{ChunkMessage, ChunkReceiver};
use fleet_types::{CommandRequest, CommandResponse, CommandType};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct AgentContext {
    pub install_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub executor: Arc<StepExecutor>,
    pub chunk_receiver: Arc<ChunkReceiver>,
    pub supervisor: Arc<ProcessSupervisor>,
    pub precheck_config: PrecheckConfig,
    pub events: fleet_events::EventSender,
    pub host_id: String,
}

fn chunk_from_params(params: &HashMap<String, String>) -> Result<ChunkMessage, Error> {
    let get = |key: &str| {
        params
            .get(key)
            .cloned()
            .ok_or_else(|| Error::internal(format!("missing chunk param `{key}`")))
    };
    let chunk_bytes = BASE64
        .decode(get("chunk")?)
        .map_err(|e| Error::internal(format!("invalid chunk encoding: {e}")))?;
    Ok(ChunkMessage {
        version: get("version")?,
        filename: get("file_name")?,
        offset: get("offset")?.parse().map_err(|_| Error::internal("invalid offset"))?,
        total_size: get("total_size")?
            .parse()
            .map_err(|_| Error::internal("invalid total_size"))?,
        chunk_bytes,
        is_last: params.get("is_last").is_some_and(|v| v == "true"),
        expected_checksum_if_last: params.get("checksum").cloned(),
    })
}

async fn handle_chunk(ctx: &AgentContext, logical_name: &str, request: &CommandRequest) -> CommandResponse {
    let chunk = match chunk_from_params(&request.params) {
        Ok(chunk) => chunk,
        Err(err) => return CommandResponse::failed(&request.command_id, err.to_string()),
    };

    match ctx.chunk_receiver.receive_chunk(logical_name, chunk).await {
        Ok(true) => CommandResponse::success(&request.command_id, "transfer complete"),
        Ok(false) => CommandResponse::running(&request.command_id, 0, "chunk accepted"),
        Err(err) => CommandResponse::failed(&request.command_id, err.to_string()),
    }
}

async fn handle_install_plugin(ctx: &AgentContext, request: &CommandRequest) -> CommandResponse {
    let Some(plugin_name) = request.params.get("plugin_name") else {
        return CommandResponse::failed(&request.command_id, "missing plugin_name");
    };
    let Some(version) = request.params.get("version") else {
        return CommandResponse::failed(&request.command_id, "missing version");
    };
    let install_dir = request
        .params
        .get("install_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.install_dir.clone());

    let artifact = resolve_artifact_id(plugin_name);
    let filename = format!("{artifact}-{version}.jar");
    let staged = ctx.staging_dir.join(&filename);
    let connectors_dir = install_dir.join("connectors");

    if let Err(err) = tokio::fs::create_dir_all(&connectors_dir).await {
        return CommandResponse::failed(&request.command_id, format!("{err}"));
    }
    if let Err(err) = fleet_archive::move_or_copy(&staged, &connectors_dir.join(&filename)).await {
        return CommandResponse::failed(&request.command_id, err.to_string());
    }

    CommandResponse::success(&request.command_id, format!("installed {filename}"))
}

async fn handle_start(ctx: &AgentContext, request: &CommandRequest) -> CommandResponse {
    let mut params = request.params.clone();
    params
        .entry("install_dir".to_string())
        .or_insert_with(|| ctx.install_dir.display().to_string());
    match ctx.supervisor.start(&ctx.host_id, "node", params).await {
        Ok(()) => CommandResponse::success(&request.command_id, "started"),
        Err(err) => CommandResponse::failed(&request.command_id, err.to_string()),
    }
}

async fn handle_stop(ctx: &AgentContext, request: &CommandRequest) -> CommandResponse {
    match ctx.supervisor.stop(&ctx.host_id).await {
        Ok(()) => CommandResponse::success(&request.command_id, "stopped"),
        Err(err) => CommandResponse::failed(&request.command_id, err.to_string()),
    }
}

async fn handle_restart(ctx: &AgentContext, request: &CommandRequest) -> CommandResponse {
    if let Err(err) = ctx.supervisor.stop(&ctx.host_id).await {
        return CommandResponse::failed(&request.command_id, err.to_string());
    }
    handle_start(ctx, request).await
}

async fn handle_precheck(ctx: &AgentContext, request: &CommandRequest) -> CommandResponse {
    let result = fleet_precheck::run_checks(&ctx.host_id, &ctx.precheck_config, &ctx.events).await;
    let passed = result.overall_status != fleet_types::PrecheckStatus::Failed;
    match serde_json::to_string(&result) {
        Ok(output) if passed => CommandResponse::success(&request.command_id, output),
        Ok(output) => CommandResponse::failed(&request.command_id, output),
        Err(err) => CommandResponse::failed(&request.command_id, err.to_string()),
    }
}

/// Runs an `install`/`upgrade` command, forwarding per-step progress to
/// `responses` as the step executor reports it, and returning the
/// terminal response once the run finishes.
async fn handle_install(
    ctx: &AgentContext,
    request: &CommandRequest,
    responses: mpsc::UnboundedSender<CommandResponse>,
) -> CommandResponse {
    let params = match InstallParams::from_map(&request.params) {
        Ok(params) => params,
        Err(err) => return CommandResponse::failed(&request.command_id, err.to_string()),
    };

    let command_id = request.command_id.clone();
    let progress_tx = responses.clone();
    let on_progress = move |step: fleet_types::InstallStep, progress: u8, message: String| {
        let _ = progress_tx.send(CommandResponse::running(
            &command_id,
            progress,
            format!("[{}] {message}", step.name()),
        ));
    };

    match ctx.executor.run(&params, &on_progress).await {
        Ok(()) => CommandResponse::success(&request.command_id, "installation complete"),
        Err(err) => CommandResponse::failed(&request.command_id, err.to_string()),
    }
}

/// Dispatches one request, pushing every intermediate response onto
/// `responses` and returning once the final one has also been pushed.
pub async fn dispatch(ctx: &AgentContext, request: CommandRequest, responses: mpsc::UnboundedSender<CommandResponse>) {
    let response = match request.command_type {
        CommandType::Precheck => handle_precheck(ctx, &request).await,
        CommandType::Install | CommandType::Upgrade => {
            handle_install(ctx, &request, responses.clone()).await
        }
        CommandType::TransferPackage => handle_chunk(ctx, "package", &request).await,
        CommandType::TransferPlugin => {
            let logical_name = request.params.get("plugin_name").cloned().unwrap_or_else(|| "plugin".to_string());
            handle_chunk(ctx, &logical_name, &request).await
        }
        CommandType::InstallPlugin => handle_install_plugin(ctx, &request).await,
        CommandType::Start => handle_start(ctx, &request).await,
        CommandType::Stop => handle_stop(ctx, &request).await,
        CommandType::Restart => handle_restart(ctx, &request).await,
        CommandType::Status => {
            CommandResponse::success(&request.command_id, format!("host {} running", ctx.host_id))
        }
        CommandType::CollectLogs | CommandType::Uninstall | CommandType::UninstallPlugin | CommandType::ListPlugins => {
            CommandResponse::failed(&request.command_id, format!("{:?} is not implemented on this agent", request.command_type))
        }
    };

    let _ = responses.send(response);
}
