//! Controller-side sequential chunk sender (§4.3)
//!
//! Sends chunks of a local file in order, waiting for an ACK after
//! each one. Accepts either `running` or `success` as a positive ACK;
//! any chunk failure (error, wrong ACK, or timeout) aborts the whole
//! transfer immediately rather than skipping ahead.

use crate::chunk::{ChunkAck, ChunkMessage, CHUNK_SIZE};
use async_trait::async_trait;
use fleet_archive::sha256_file;
use fleet_errors::{Error, TransferError};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Per-chunk ACK wait timeout.
pub const CHUNK_ACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Abstracts the remote endpoint a chunk is sent to, so this module
/// does not depend on any concrete wire transport.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    async fn send_chunk(&self, chunk: ChunkMessage) -> Result<ChunkAck, Error>;
}

/// Reads `path` in order and pushes it through `sink` as a sequence of
/// [`ChunkMessage`]s, computing the final SHA-256 for the last chunk.
///
/// # Errors
/// Returns a [`TransferError`] if any chunk's ACK times out, is
/// `failed`, or the sink itself errors. The transfer is not resumed
/// automatically; a caller retrying should resend starting at byte 0
/// and rely on the Agent's offset-addressed idempotence for any bytes
/// it already has.
pub async fn send_file(
    sink: &dyn ChunkSink,
    path: &Path,
    version: &str,
    filename: &str,
) -> Result<(), Error> {
    let total_size = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?
        .len();
    let digest = sha256_file(path).await?;

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;

    let mut offset: u64 = 0;
    let mut buf = vec![0u8; CHUNK_SIZE];

    while offset < total_size {
        file.seek(std::io::SeekFrom::Start(offset))
            .await
            .map_err(|e| TransferError::Io {
                filename: filename.to_string(),
                message: e.to_string(),
            })?;
        let n = file.read(&mut buf).await.map_err(|e| TransferError::Io {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }

        let is_last = offset + n as u64 >= total_size;
        let chunk = ChunkMessage {
            version: version.to_string(),
            filename: filename.to_string(),
            offset,
            total_size,
            chunk_bytes: buf[..n].to_vec(),
            is_last,
            expected_checksum_if_last: is_last.then(|| digest.clone()),
        };

        let ack = tokio::time::timeout(CHUNK_ACK_TIMEOUT, sink.send_chunk(chunk))
            .await
            .map_err(|_| TransferError::ChunkTimeout {
                filename: filename.to_string(),
                offset,
                seconds: CHUNK_ACK_TIMEOUT.as_secs(),
            })??;

        match ack {
            ChunkAck::Success | ChunkAck::Running => {}
            ChunkAck::Failed => {
                return Err(TransferError::Io {
                    filename: filename.to_string(),
                    message: format!("agent rejected chunk at offset {offset}"),
                }
                .into());
            }
        }

        offset += n as u64;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingSink {
        received: Mutex<Vec<ChunkMessage>>,
        fail_at: AtomicUsize,
    }

    #[async_trait]
    impl ChunkSink for RecordingSink {
        async fn send_chunk(&self, chunk: ChunkMessage) -> Result<ChunkAck, Error> {
            let idx = self.received.lock().unwrap().len();
            if idx == self.fail_at.load(Ordering::SeqCst) {
                return Ok(ChunkAck::Failed);
            }
            self.received.lock().unwrap().push(chunk);
            Ok(ChunkAck::Success)
        }
    }

    #[tokio::test]
    async fn sends_small_file_as_single_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        tokio::fs::write(&path, b"small payload").await.unwrap();

        let sink = RecordingSink {
            received: Mutex::new(Vec::new()),
            fail_at: AtomicUsize::new(usize::MAX),
        };

        send_file(&sink, &path, "2.3.12", "f.bin").await.unwrap();

        let received = sink.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].is_last);
        assert!(received[0].expected_checksum_if_last.is_some());
    }

    #[tokio::test]
    async fn aborts_on_rejected_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        tokio::fs::write(&path, b"payload").await.unwrap();

        let sink = RecordingSink {
            received: Mutex::new(Vec::new()),
            fail_at: AtomicUsize::new(0),
        };

        let err = send_file(&sink, &path, "2.3.12", "f.bin").await.unwrap_err();
        assert!(matches!(err, Error::Transfer(TransferError::Io { .. })));
    }
}
