//! Chunked package/plugin transfer error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TransferError {
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("size mismatch for {filename}: expected {expected}, got {actual}")]
    SizeMismatch {
        filename: String,
        expected: u64,
        actual: u64,
    },

    #[error("no in-flight transfer for {0:?}")]
    NotFound((String, String, String)),

    #[error("chunk ACK timed out after {seconds}s for {filename} at offset {offset}")]
    ChunkTimeout {
        filename: String,
        offset: u64,
        seconds: u64,
    },

    #[error("a transfer for {scope_key:?} is already in flight")]
    AlreadyInFlight { scope_key: (String, String, String) },

    #[error("transfer io error for {filename}: {message}")]
    Io { filename: String, message: String },

    #[error("transfer cancelled for {filename}")]
    Cancelled { filename: String },
}

impl ErrorKind for TransferError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::ChunkTimeout { .. } | Self::Io { .. })
    }
}
