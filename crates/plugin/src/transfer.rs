//! Bridges plugin jar delivery onto the command transport (§4.3 carried
//! over into §6.1's plugin transfer params: `plugin_name, file_type`)

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use fleet_errors::Error;
use fleet_transfer::{ChunkAck, ChunkMessage, ChunkSink};
use fleet_transport::CommandTransport;
use fleet_types::{CommandStatus, CommandType};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginFileType {
    Connector,
    Dependency,
}

impl PluginFileType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Connector => "connector",
            Self::Dependency => "dependency",
        }
    }
}

pub struct PluginChunkSink {
    transport: Arc<CommandTransport>,
    agent_id: String,
    plugin_name: String,
    file_type: PluginFileType,
    timeout_s: u64,
}

impl PluginChunkSink {
    #[must_use]
    pub fn new(
        transport: Arc<CommandTransport>,
        agent_id: impl Into<String>,
        plugin_name: impl Into<String>,
        file_type: PluginFileType,
        timeout_s: u64,
    ) -> Self {
        Self {
            transport,
            agent_id: agent_id.into(),
            plugin_name: plugin_name.into(),
            file_type,
            timeout_s,
        }
    }
}

#[async_trait]
impl ChunkSink for PluginChunkSink {
    async fn send_chunk(&self, chunk: ChunkMessage) -> Result<ChunkAck, Error> {
        let mut params = HashMap::new();
        params.insert("version".to_string(), chunk.version);
        params.insert("file_name".to_string(), chunk.filename);
        params.insert("offset".to_string(), chunk.offset.to_string());
        params.insert("total_size".to_string(), chunk.total_size.to_string());
        params.insert("chunk".to_string(), BASE64.encode(&chunk.chunk_bytes));
        params.insert("is_last".to_string(), chunk.is_last.to_string());
        params.insert("plugin_name".to_string(), self.plugin_name.clone());
        params.insert("file_type".to_string(), self.file_type.as_str().to_string());
        if let Some(checksum) = chunk.expected_checksum_if_last {
            params.insert("checksum".to_string(), checksum);
        }

        let response = self
            .transport
            .send_sync(&self.agent_id, CommandType::TransferPlugin, params, self.timeout_s)
            .await?;

        Ok(match response.status {
            CommandStatus::Success => ChunkAck::Success,
            CommandStatus::Running => ChunkAck::Running,
            CommandStatus::Failed => ChunkAck::Failed,
        })
    }
}
