//! Lightweight progress sampling for downloads and transfers
//!
//! Mirrors the throttled-update contract in the mirror downloader's
//! design: progress, downloaded bytes and speed are recomputed at most
//! every 500ms, except that completion always updates regardless of the
//! last sample time.

use std::time::{Duration, Instant};

pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct ProgressSample {
    pub progress: u8,
    pub downloaded_bytes: u64,
    pub speed_bps: u64,
}

/// Tracks enough state to throttle progress emission and compute a
/// smoothed instantaneous transfer rate.
pub struct ProgressTracker {
    total_bytes: Option<u64>,
    last_sample_at: Instant,
    last_sample_bytes: u64,
    started_at: Instant,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(total_bytes: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            total_bytes,
            last_sample_at: now,
            last_sample_bytes: 0,
            started_at: now,
        }
    }

    /// Returns `Some(sample)` if enough time has elapsed since the last
    /// sample, or if `force` is set (used at completion).
    pub fn sample(&mut self, downloaded_bytes: u64, force: bool) -> Option<ProgressSample> {
        let now = Instant::now();
        if !force && now.duration_since(self.last_sample_at) < SAMPLE_INTERVAL {
            return None;
        }

        let elapsed_total = now.duration_since(self.started_at).as_secs_f64().max(0.001);
        let speed_bps = (downloaded_bytes as f64 / elapsed_total) as u64;

        let progress = self
            .total_bytes
            .filter(|t| *t > 0)
            .map_or(0, |t| ((downloaded_bytes as f64 / t as f64) * 100.0).min(100.0) as u8);

        self.last_sample_at = now;
        self.last_sample_bytes = downloaded_bytes;

        Some(ProgressSample {
            progress,
            downloaded_bytes,
            speed_bps,
        })
    }

    #[must_use]
    pub fn last_sample_bytes(&self) -> u64 {
        self.last_sample_bytes
    }
}
