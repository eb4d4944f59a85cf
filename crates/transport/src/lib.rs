#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Command transport (component 6)
//!
//! Multiplexes request/response commands over a single stream per
//! Agent, correlated by `command_id`, with both a blocking
//! [`CommandTransport::send_sync`] and a fire-and-forget
//! [`CommandTransport::send_async`] plus [`CommandTransport::get_status`]
//! poll.

pub mod channel;
pub mod inprocess;
pub mod tcp;
pub mod transport;

pub use channel::{read_frame, write_frame, Channel};
pub use inprocess::InProcessChannel;
pub use tcp::TcpChannel;
pub use transport::CommandTransport;
