//! FleetD Agent entry point
//!
//! Wires the local step executor, chunk receiver and process supervisor
//! together behind an [`AgentContext`], determines this host's stable
//! identity, then hands off to the Controller dial loop.

mod cli;
mod connection;
mod control_frame;
mod dispatch;
mod logging;
mod process_controller;

use crate::cli::Cli;
use crate::dispatch::AgentContext;
use crate::process_controller::OsProcessController;
use clap::Parser;
use fleet_agent_exec::{NoopClusterRegistrar, StepExecutor};
use fleet_cache::PackageCache;
use fleet_config::Config;
use fleet_net::MirrorDownloader;
use fleet_precheck::PrecheckConfig;
use fleet_supervisor::{NoopRestartCallback, ProcessSupervisor};
use fleet_transfer::ChunkReceiver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const ENGINE: &str = "seatunnel";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fleetd-agent: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), fleet_errors::Error> {
    let mut config = Config::load_or_default(&cli.config).await?;
    config.merge_env()?;
    if cli.json {
        config.logging.json = true;
    }
    if let Some(controller_addr) = cli.controller_addr {
        config.agent.controller_addr = controller_addr;
    }
    config.validate()?;

    logging::init_tracing(&config.logging);

    let (events, event_rx) = fleet_events::channel();
    tokio::spawn(logging::run_event_bridge(event_rx));

    let host_id = load_or_create_host_id().await?;
    let install_dir = config.agent.install_dir.clone();
    let staging_dir = PathBuf::from(fleet_config::constants::DEFAULT_STATE_DIR).join("staging");
    tokio::fs::create_dir_all(&staging_dir)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, &staging_dir))?;

    let cache = Arc::new(PackageCache::new(ENGINE, fleet_config::constants::DEFAULT_CACHE_DIR));
    let downloader = Arc::new(MirrorDownloader::new(
        ENGINE,
        fleet_config::constants::DEFAULT_CACHE_DIR,
        events.clone(),
    ));
    let executor = Arc::new(StepExecutor::new(
        ENGINE,
        install_dir.clone(),
        cache,
        downloader,
        Arc::new(NoopClusterRegistrar),
    ));

    let chunk_receiver = Arc::new(ChunkReceiver::new(staging_dir.clone(), events.clone()));

    let controller = Arc::new(OsProcessController::new());
    let supervisor = ProcessSupervisor::new(
        events.clone(),
        controller.clone(),
        Arc::new(NoopRestartCallback),
        config.restart,
    );
    controller.bind_supervisor(&supervisor);

    let precheck_config = PrecheckConfig {
        install_dir: install_dir.clone(),
        ..PrecheckConfig::default()
    };

    let ctx = Arc::new(AgentContext {
        install_dir,
        staging_dir,
        executor,
        chunk_receiver,
        supervisor,
        precheck_config,
        events,
        host_id,
    });

    connection::run(config.agent.controller_addr, config.agent.heartbeat_interval_s, ctx).await;
    Ok(())
}

/// Loads this host's persisted agent id, or mints and persists a fresh
/// one. Kept stable across restarts so the Controller's host/agent
/// mapping (`host_id == agent_id`, see [`fleet_registry::AgentRegistry`])
/// survives a reboot.
async fn load_or_create_host_id() -> Result<String, fleet_errors::Error> {
    let state_dir = PathBuf::from(fleet_config::constants::DEFAULT_STATE_DIR);
    tokio::fs::create_dir_all(&state_dir)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, &state_dir))?;
    let id_path = state_dir.join("agent_id");

    match tokio::fs::read_to_string(&id_path).await {
        Ok(contents) => {
            let id = contents.trim().to_string();
            if !id.is_empty() {
                return Ok(id);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(fleet_errors::Error::io_with_path(&e, &id_path)),
    }

    let id = uuid::Uuid::new_v4().to_string();
    tokio::fs::write(&id_path, &id)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, &id_path))?;
    Ok(id)
}
