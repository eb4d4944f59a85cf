#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Plugin catalog and delivery (§4.10)

mod catalog;
mod deliver;
mod transfer;

pub use catalog::PluginCatalog;
pub use deliver::{deliver_plugin, PLUGIN_COMMAND_TIMEOUT_S};
pub use transfer::{PluginChunkSink, PluginFileType};
