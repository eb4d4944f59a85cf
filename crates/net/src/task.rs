//! Download task state (§3 `DownloadTask`)

use chrono::{DateTime, Utc};
use fleet_types::MirrorId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Completed,
    Failed,
    Cancelled,
}

impl DownloadStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub id: String,
    pub version: String,
    pub mirror: MirrorId,
    pub url: String,
    pub status: DownloadStatus,
    pub progress: u8,
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub speed_bps: u64,
    pub message: Option<String>,
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl DownloadTask {
    #[must_use]
    pub fn new(version: String, mirror: MirrorId, url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            version,
            mirror,
            url,
            status: DownloadStatus::Pending,
            progress: 0,
            downloaded_bytes: 0,
            total_bytes: None,
            speed_bps: 0,
            message: None,
            error: None,
            start_time: Utc::now(),
            end_time: None,
        }
    }
}
