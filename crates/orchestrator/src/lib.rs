#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Installation orchestration engine
//!
//! Drives one host through the nine-step installation state machine
//! (§4.6): resolves the Agent, ensures the package is cached locally
//! (downloading from a mirror if needed), pushes it over the chunked
//! transfer bridge, dispatches the `install` command, and polls the
//! command transport until the Agent reports a terminal result.
//!
//! External concerns the Controller owns but this crate doesn't —
//! REST/auth, the node database, the plugin catalog's storage — are
//! expressed as collaborator traits in [`collaborators`] so this crate
//! compiles and runs standalone.

pub mod collaborators;
pub mod orchestrator;
pub mod transfer_bridge;
pub mod validate;

pub use collaborators::{
    ConfigInitializer, HostProvider, NoopConfigInitializer, NoopNodeStarter,
    NoopNodeStatusUpdater, NoopPluginRecorder, NoopPluginTransferer, NodeStarter,
    NodeStatusUpdater, PluginRecorder, PluginTransferer,
};
pub use orchestrator::{InstallationOrchestrator, POLL_INTERVAL};
pub use transfer_bridge::TransportChunkSink;
pub use validate::validate;
