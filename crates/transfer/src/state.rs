//! In-flight chunked transfer state, keyed by `(logical_name, version, filename)`

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Identifies one logical file's chunked transfer. `logical_name` is
/// `"package"` or `"plugin"`; `version` is the engine or plugin version.
pub type TransferScopeKey = (String, String, String);

/// State of one in-flight push, owned exclusively by the Agent side.
///
/// Invariants: writes are offset-addressed; `received_bytes` is
/// monotonically non-decreasing and never exceeds `total_size`; finalize
/// succeeds only when `received_bytes == total_size` and the computed
/// digest matches `expected_digest`.
#[derive(Debug, Clone)]
pub struct TransferState {
    pub scope_key: TransferScopeKey,
    pub temp_path: PathBuf,
    pub received_bytes: u64,
    pub total_size: u64,
    pub expected_digest: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl TransferState {
    #[must_use]
    pub fn new(scope_key: TransferScopeKey, temp_path: PathBuf, total_size: u64) -> Self {
        Self {
            scope_key,
            temp_path,
            received_bytes: 0,
            total_size,
            expected_digest: None,
            start_time: Utc::now(),
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.received_bytes >= self.total_size
    }

    pub fn record_write(&mut self, offset: u64, len: u64) {
        self.received_bytes = self.received_bytes.max(offset + len);
    }
}

#[must_use]
pub fn temp_filename(filename: &str) -> String {
    format!("{filename}.part")
}
