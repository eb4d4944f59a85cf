//! Length-prefixed JSON-over-TCP `Channel` implementation
//!
//! Stands in for the gRPC-style bidirectional stream (§6.1) that would
//! otherwise carry the Controller<->Agent protocol: a real deployment
//! would put protobuf/tonic here, but the message shapes and
//! correlation semantics are identical either way.

use crate::channel::{read_frame, write_frame, Channel};
use crate::transport::CommandTransport;
use async_trait::async_trait;
use fleet_errors::Error;
use fleet_types::{CommandRequest, CommandResponse};
use std::sync::Arc;
use tokio::io::{AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

pub struct TcpChannel {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl TcpChannel {
    /// Splits `stream` into a write half owned by this channel and a
    /// read half driven by a spawned task that feeds decoded responses
    /// into `transport`.
    #[must_use]
    pub fn spawn(stream: TcpStream, transport: Arc<CommandTransport>) -> Arc<Self> {
        let (read_half, write_half) = tokio::io::split(stream);
        let channel = Arc::new(Self {
            writer: Mutex::new(Box::new(write_half)),
        });

        tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            loop {
                match read_frame::<_, CommandResponse>(&mut reader).await {
                    Ok(Some(response)) => transport.handle_response(response),
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(error = %err, "command transport read error, closing channel");
                        break;
                    }
                }
            }
        });

        channel
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn send_request(&self, request: &CommandRequest) -> Result<(), Error> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, request)
            .await
            .map_err(|e| Error::io_with_path(&e, "tcp channel"))
    }
}
