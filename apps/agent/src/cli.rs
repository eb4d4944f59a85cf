//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetd-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FleetD Agent: installs and supervises the engine on this host")]
pub struct Cli {
    /// Output logs as JSON
    #[arg(long)]
    pub json: bool,

    /// Use an alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `agent.controller_addr` from the config file
    #[arg(long)]
    pub controller_addr: Option<String>,
}
