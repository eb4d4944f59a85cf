//! Agent-side offset-addressed chunk receiver (§4.3)
//!
//! One [`TransferState`] exists per scope key at a time (single-flight).
//! Writes are idempotent under retry: a chunk resent at the same offset
//! simply overwrites the same bytes, so a lost ACK followed by a resend
//! never corrupts the file. Finalize is single-writer: it consumes the
//! state entry, so a second finalize call for the same scope key after
//! success observes `NotFound`.

use crate::chunk::ChunkMessage;
use crate::state::{temp_filename, TransferScopeKey, TransferState};
use dashmap::DashMap;
use fleet_archive::sha256_file;
use fleet_errors::{Error, TransferError};
use fleet_events::{EventEmitter, EventSender, TransferEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

pub struct ChunkReceiver {
    dest_dir: PathBuf,
    events: EventSender,
    transfers: DashMap<TransferScopeKey, Arc<Mutex<TransferState>>>,
}

impl ChunkReceiver {
    #[must_use]
    pub fn new(dest_dir: impl Into<PathBuf>, events: EventSender) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            events,
            transfers: DashMap::new(),
        }
    }

    /// Writes one chunk at its offset, creating the transfer's temp file
    /// on first contact. Finalizes automatically when `is_last` is set.
    ///
    /// # Errors
    /// Returns `TransferError::AlreadyInFlight` if a different transfer
    /// with the same scope key is mid-flight with a mismatched total
    /// size, or an I/O/integrity error from the write or finalize step.
    pub async fn receive_chunk(
        &self,
        logical_name: &str,
        chunk: ChunkMessage,
    ) -> Result<bool, Error> {
        let scope_key = (
            logical_name.to_string(),
            chunk.version.clone(),
            chunk.filename.clone(),
        );

        let state_lock = {
            if let Some(existing) = self.transfers.get(&scope_key) {
                Arc::clone(existing.value())
            } else {
                tokio::fs::create_dir_all(&self.dest_dir)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &self.dest_dir))?;
                let temp_path = self.dest_dir.join(temp_filename(&chunk.filename));
                let state = TransferState::new(scope_key.clone(), temp_path, chunk.total_size);
                let lock = Arc::new(Mutex::new(state));
                self.transfers.insert(scope_key.clone(), Arc::clone(&lock));
                lock
            }
        };

        {
            let mut state = state_lock.lock().await;
            if state.total_size != chunk.total_size {
                return Err(TransferError::SizeMismatch {
                    filename: chunk.filename.clone(),
                    expected: state.total_size,
                    actual: chunk.total_size,
                }
                .into());
            }

            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&state.temp_path)
                .await
                .map_err(|e| TransferError::Io {
                    filename: chunk.filename.clone(),
                    message: e.to_string(),
                })?;
            file.seek(std::io::SeekFrom::Start(chunk.offset))
                .await
                .map_err(|e| TransferError::Io {
                    filename: chunk.filename.clone(),
                    message: e.to_string(),
                })?;
            file.write_all(&chunk.chunk_bytes)
                .await
                .map_err(|e| TransferError::Io {
                    filename: chunk.filename.clone(),
                    message: e.to_string(),
                })?;
            file.flush().await.map_err(|e| TransferError::Io {
                filename: chunk.filename.clone(),
                message: e.to_string(),
            })?;

            state.record_write(chunk.offset, chunk.chunk_bytes.len() as u64);
            if chunk.is_last {
                state.expected_digest = chunk.expected_checksum_if_last.clone();
            }

            self.events.emit_transfer(TransferEvent::ChunkReceived {
                filename: chunk.filename.clone(),
                offset: chunk.offset,
                total_size: chunk.total_size,
            });
        }

        if chunk.is_last {
            self.finalize(&scope_key, &chunk.filename).await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Verifies the completed temp file's digest and renames it into
    /// place, removing the scope key's entry so a future transfer for
    /// the same key starts fresh.
    async fn finalize(&self, scope_key: &TransferScopeKey, filename: &str) -> Result<(), Error> {
        let Some((_, state_lock)) = self.transfers.remove(scope_key) else {
            return Err(TransferError::NotFound(scope_key.clone()).into());
        };
        let state = state_lock.lock().await;

        if !state.is_complete() {
            return Err(TransferError::SizeMismatch {
                filename: filename.to_string(),
                expected: state.total_size,
                actual: state.received_bytes,
            }
            .into());
        }

        if let Some(expected) = &state.expected_digest {
            let actual = sha256_file(&state.temp_path).await?;
            if !fleet_archive::digests_match(&actual, expected) {
                return Err(TransferError::ChecksumMismatch {
                    filename: filename.to_string(),
                    expected: expected.clone(),
                    actual,
                }
                .into());
            }
        } else {
            let _ = sha256_file(&state.temp_path).await?;
        }

        let dest = self.dest_dir.join(filename);
        fleet_archive::move_or_copy(&state.temp_path, &dest).await?;

        self.events.emit_transfer(TransferEvent::Finalized {
            filename: filename.to_string(),
            size: state.total_size,
        });

        Ok(())
    }

    /// Cancels an in-flight transfer, removing its temp file.
    ///
    /// # Errors
    /// Returns `TransferError::NotFound` if no transfer exists for
    /// `scope_key`.
    pub async fn cancel(&self, scope_key: &TransferScopeKey) -> Result<(), Error> {
        let Some((_, state_lock)) = self.transfers.remove(scope_key) else {
            return Err(TransferError::NotFound(scope_key.clone()).into());
        };
        let state = state_lock.lock().await;
        let _ = tokio::fs::remove_file(&state.temp_path).await;
        self.events.emit_transfer(TransferEvent::Cancelled {
            filename: scope_key.2.clone(),
        });
        Ok(())
    }

    #[must_use]
    pub fn is_in_flight(&self, scope_key: &TransferScopeKey) -> bool {
        self.transfers.contains_key(scope_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(filename: &str, offset: u64, bytes: &[u8], total: u64, last: bool, digest: Option<String>) -> ChunkMessage {
        ChunkMessage {
            version: "2.3.12".to_string(),
            filename: filename.to_string(),
            offset,
            total_size: total,
            chunk_bytes: bytes.to_vec(),
            is_last: last,
            expected_checksum_if_last: digest,
        }
    }

    #[tokio::test]
    async fn receives_in_order_and_finalizes() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = fleet_events::channel();
        let receiver = ChunkReceiver::new(dir.path(), tx);

        let payload = b"hello world, this is a test payload";
        let digest = {
            let tmp = dir.path().join("check.bin");
            tokio::fs::write(&tmp, payload).await.unwrap();
            let d = fleet_archive::sha256_file(&tmp).await.unwrap();
            tokio::fs::remove_file(&tmp).await.unwrap();
            d
        };

        let done1 = receiver
            .receive_chunk("package", chunk("pkg.tar.gz", 0, &payload[..10], payload.len() as u64, false, None))
            .await
            .unwrap();
        assert!(!done1);

        let done2 = receiver
            .receive_chunk(
                "package",
                chunk("pkg.tar.gz", 10, &payload[10..], payload.len() as u64, true, Some(digest)),
            )
            .await
            .unwrap();
        assert!(done2);

        let final_path = dir.path().join("pkg.tar.gz");
        assert_eq!(tokio::fs::read(&final_path).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn duplicate_chunk_at_same_offset_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = fleet_events::channel();
        let receiver = ChunkReceiver::new(dir.path(), tx);
        let payload = b"0123456789";

        receiver
            .receive_chunk("package", chunk("f.bin", 0, payload, 10, false, None))
            .await
            .unwrap();
        // Resend the same chunk, simulating a lost ACK.
        receiver
            .receive_chunk("package", chunk("f.bin", 0, payload, 10, false, None))
            .await
            .unwrap();

        let key = ("package".to_string(), "2.3.12".to_string(), "f.bin".to_string());
        assert!(receiver.is_in_flight(&key));
    }
}
