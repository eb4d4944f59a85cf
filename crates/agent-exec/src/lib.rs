#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Agent-side installation step execution (§4.8)
//!
//! The Controller dispatches one `install` command carrying a flat
//! parameter map; this crate turns that map into the nine ordered
//! steps that actually install and configure the engine on a host.

mod alias;
mod checkpoint_template;
mod executor;
mod params;
mod registrar;
mod yaml_edit;

pub use alias::resolve_artifact_id;
pub use executor::{ProgressFn, StepExecutor};
pub use params::InstallParams;
pub use registrar::{ClusterRegistrar, NoopClusterRegistrar};
