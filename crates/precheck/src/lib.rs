#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Host precheck engine (component 7)
//!
//! Runs a fixed set of environment checks against the local host
//! (memory, CPU, disk, ports, runtime version, directory writability,
//! process/HTTP liveness) and rolls them up into a structured
//! [`fleet_types::PrecheckResult`].

pub mod checks;
pub mod config;
pub mod engine;

pub use config::PrecheckConfig;
pub use engine::{run_checks, CHECK_NAMES};
