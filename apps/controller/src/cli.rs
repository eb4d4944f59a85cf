//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetd-controller")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FleetD Controller: orchestrates engine installation across Agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Parser)]
pub struct GlobalArgs {
    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Controller daemon: accept Agent connections and serve
    /// installation requests issued on this process's admin socket.
    Serve {
        /// Override `controller.bind_addr` from the config file.
        #[arg(long)]
        bind_addr: Option<String>,
    },
}
