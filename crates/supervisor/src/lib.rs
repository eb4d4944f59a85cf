#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Process supervision and crash-restart rate limiting (§4.9)

mod process;
mod restart_controller;
mod supervisor;

pub use process::{
    NoopProcessController, NoopRestartCallback, ProcessController, RestartCallback,
    RestartOutcome, StartOutcome,
};
pub use restart_controller::{RestartController, RestartDecision};
pub use supervisor::ProcessSupervisor;
