//! Mirror downloader error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("HTTP error {status} from {url}")]
    HttpError { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network unavailable")]
    NetworkUnavailable,

    #[error("checksum mismatch for {version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        version: String,
        expected: String,
        actual: String,
    },

    #[error("download cancelled for version {version}")]
    Cancelled { version: String },

    #[error("no non-terminal task for version {version}")]
    TaskNotFound { version: String },

    #[error("unknown mirror: {0}")]
    UnknownMirror(String),
}

impl ErrorKind for NetworkError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::DownloadFailed(_)
                | Self::NetworkUnavailable
                | Self::HttpError { .. }
        )
    }
}
