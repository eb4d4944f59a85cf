#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Chunked package/plugin transfer protocol (component 4)
//!
//! Offset-addressed push from Controller to Agent. The Agent side
//! ([`receiver::ChunkReceiver`]) is idempotent under chunk retry; the
//! Controller side ([`sender::send_file`]) sends strictly in order and
//! aborts the whole transfer on the first rejected or timed-out chunk.

pub mod chunk;
pub mod receiver;
pub mod sender;
pub mod state;

pub use chunk::{ChunkAck, ChunkMessage, CHUNK_SIZE};
pub use receiver::ChunkReceiver;
pub use sender::{send_file, ChunkSink, CHUNK_ACK_TIMEOUT};
pub use state::{TransferScopeKey, TransferState};
