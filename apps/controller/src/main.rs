//! FleetD Controller entry point
//!
//! Wires the registry, command transport, package cache/downloader and
//! plugin catalog together behind the installation orchestrator, then
//! accepts Agent connections until killed.

mod accept;
mod cli;
mod collaborators;
mod control_frame;
mod logging;

use crate::cli::{Cli, Commands};
use crate::collaborators::{CatalogPluginRecorder, CatalogPluginTransferer, TransportNodeStarter};
use clap::Parser;
use fleet_cache::PackageCache;
use fleet_config::Config;
use fleet_net::MirrorDownloader;
use fleet_orchestrator::{
    InstallationOrchestrator, NoopConfigInitializer, NoopNodeStatusUpdater,
};
use fleet_plugin::PluginCatalog;
use fleet_registry::AgentRegistry;
use fleet_transport::CommandTransport;
use std::process::ExitCode;
use std::sync::Arc;

const ENGINE: &str = "seatunnel";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fleetd-controller: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), fleet_errors::Error> {
    let mut config = Config::load_or_default(&cli.global.config).await?;
    config.merge_env()?;
    if cli.global.json {
        config.logging.json = true;
    }
    config.validate()?;

    logging::init_tracing(&config.logging);

    let (events, event_rx) = fleet_events::channel();
    tokio::spawn(logging::run_event_bridge(event_rx));

    let Commands::Serve { bind_addr } = cli.command;
    let bind_addr = bind_addr.unwrap_or(config.controller.bind_addr.clone());

    let registry = Arc::new(AgentRegistry::with_timeout(
        events.clone(),
        chrono::Duration::seconds(i64::try_from(config.controller.heartbeat_timeout_s).unwrap_or(90)),
    ));
    fleet_registry::spawn_scanner(Arc::clone(&registry));

    let transport = Arc::new(CommandTransport::new());
    let cache = Arc::new(PackageCache::new(ENGINE, config.controller.cache_dir.clone()));
    let downloader = Arc::new(MirrorDownloader::new(ENGINE, config.controller.cache_dir.clone(), events.clone()));
    let catalog = Arc::new(PluginCatalog::new(config.controller.cache_dir.join("plugins"), events.clone()));

    let node_starter = Arc::new(TransportNodeStarter::new(
        Arc::clone(&registry),
        Arc::clone(&transport),
        fleet_config::constants::DEFAULT_INSTALL_DIR,
        config.controller.command_timeout_s,
    ));
    let plugin_transferer = Arc::new(CatalogPluginTransferer::new(
        Arc::clone(&catalog),
        Arc::clone(&transport),
        config.controller.plugin_repo.clone(),
    ));
    let plugin_recorder = Arc::new(CatalogPluginRecorder::new(Arc::clone(&catalog)));

    let _orchestrator = InstallationOrchestrator::new(
        ENGINE,
        events.clone(),
        Arc::clone(&registry) as Arc<dyn fleet_orchestrator::HostProvider>,
        Arc::clone(&transport),
        downloader,
        cache,
        node_starter,
        Arc::new(NoopNodeStatusUpdater),
        plugin_transferer,
        Arc::new(NoopConfigInitializer),
        plugin_recorder,
    );

    accept::run(&bind_addr, registry, transport).await
}
