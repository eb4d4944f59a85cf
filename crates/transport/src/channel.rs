//! Bidirectional channel abstraction over the Controller<->Agent stream

use async_trait::async_trait;
use fleet_errors::Error;
use fleet_types::CommandRequest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// One multiplexed stream to a single Agent. A request written via
/// [`Channel::send_request`] is later matched with its response by
/// `command_id`, delivered out of band into a [`crate::CommandTransport`]
/// via [`crate::CommandTransport::handle_response`].
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_request(&self, request: &CommandRequest) -> Result<(), Error>;
}

/// Writes `value` as a 4-byte big-endian length prefix followed by its
/// JSON encoding.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> std::io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let bytes = serde_json::to_vec(value).map_err(std::io::Error::other)?;
    let len = u32::try_from(bytes.len()).map_err(std::io::Error::other)?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await
}

/// Reads one length-prefixed JSON frame, or `Ok(None)` on clean EOF.
pub async fn read_frame<R, T>(reader: &mut R) -> std::io::Result<Option<T>>
where
    R: tokio::io::AsyncRead + Unpin,
    T: serde::de::DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    let value = serde_json::from_slice(&buf).map_err(std::io::Error::other)?;
    Ok(Some(value))
}
