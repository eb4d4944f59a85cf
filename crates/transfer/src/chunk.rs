//! Wire message for a single chunked-transfer segment (§4.3)

use serde::{Deserialize, Serialize};

/// Size of one chunk in the push protocol.
pub const CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMessage {
    pub version: String,
    pub filename: String,
    pub offset: u64,
    pub total_size: u64,
    pub chunk_bytes: Vec<u8>,
    pub is_last: bool,
    pub expected_checksum_if_last: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkAck {
    Running,
    Success,
    Failed,
}
