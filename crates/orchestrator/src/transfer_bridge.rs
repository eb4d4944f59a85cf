//! Bridges `fleet-transfer`'s chunk sender onto the command transport,
//! so package/plugin pushes ride the same correlated request/response
//! channel as every other Agent command (§4.3 carried over §4.5's
//! transport, params per the wire section's `transfer_package` shape).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use fleet_errors::Error;
use fleet_transfer::{ChunkAck, ChunkMessage, ChunkSink};
use fleet_transport::CommandTransport;
use fleet_types::{CommandStatus, CommandType};
use std::collections::HashMap;
use std::sync::Arc;

pub struct TransportChunkSink {
    transport: Arc<CommandTransport>,
    agent_id: String,
    command_type: CommandType,
    timeout_s: u64,
}

impl TransportChunkSink {
    #[must_use]
    pub fn new(
        transport: Arc<CommandTransport>,
        agent_id: impl Into<String>,
        command_type: CommandType,
        timeout_s: u64,
    ) -> Self {
        Self {
            transport,
            agent_id: agent_id.into(),
            command_type,
            timeout_s,
        }
    }
}

#[async_trait]
impl ChunkSink for TransportChunkSink {
    async fn send_chunk(&self, chunk: ChunkMessage) -> Result<ChunkAck, Error> {
        let mut params = HashMap::new();
        params.insert("version".to_string(), chunk.version);
        params.insert("file_name".to_string(), chunk.filename);
        params.insert("offset".to_string(), chunk.offset.to_string());
        params.insert("total_size".to_string(), chunk.total_size.to_string());
        params.insert("chunk".to_string(), BASE64.encode(&chunk.chunk_bytes));
        params.insert("is_last".to_string(), chunk.is_last.to_string());
        if let Some(checksum) = chunk.expected_checksum_if_last {
            params.insert("checksum".to_string(), checksum);
        }

        let response = self
            .transport
            .send_sync(&self.agent_id, self.command_type, params, self.timeout_s)
            .await?;

        Ok(match response.status {
            CommandStatus::Success => ChunkAck::Success,
            CommandStatus::Running => ChunkAck::Running,
            CommandStatus::Failed => ChunkAck::Failed,
        })
    }
}
