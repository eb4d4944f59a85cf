//! Single-flight mirror package downloader (§4.1)
//!
//! One non-terminal [`DownloadTask`] may exist per version at a time.
//! A second `download` call for a version already in flight returns a
//! clone of the existing task rather than starting a duplicate stream.
//! Bytes land in `<cache_dir>/<filename>.tmp` and are published via
//! [`fleet_archive::move_or_copy`] only once the stream completes, so a
//! reader of the cache directory never observes a partial file.

use crate::mirror::package_url;
use crate::task::{DownloadStatus, DownloadTask};
use chrono::Utc;
use dashmap::DashMap;
use fleet_errors::{Error, NetworkError};
use fleet_events::{DownloadEvent, EventEmitter, EventSender, ProgressTracker};
use fleet_types::MirrorId;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct MirrorDownloader {
    engine: String,
    cache_dir: PathBuf,
    client: reqwest::Client,
    events: EventSender,
    tasks: Arc<DashMap<String, Arc<Mutex<DownloadTask>>>>,
}

impl MirrorDownloader {
    #[must_use]
    pub fn new(engine: impl Into<String>, cache_dir: impl Into<PathBuf>, events: EventSender) -> Self {
        Self {
            engine: engine.into(),
            cache_dir: cache_dir.into(),
            client: reqwest::Client::new(),
            events,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Starts (or joins) a download of `version` from `mirror`.
    ///
    /// If a non-terminal task for `version` already exists, it is
    /// returned as-is rather than starting a second stream.
    ///
    /// # Errors
    /// Returns a [`NetworkError`] wrapped in [`Error`] if the HTTP
    /// request fails to even start; streaming failures are instead
    /// recorded on the returned task and surfaced via events.
    pub async fn download(&self, version: &str, mirror: MirrorId) -> Result<DownloadTask, Error> {
        if let Some(existing) = self.tasks.get(version) {
            let task = existing.lock().await;
            if !task.status.is_terminal() {
                return Ok(task.clone());
            }
        }

        let url = package_url(mirror, &self.engine, version);
        let task = DownloadTask::new(version.to_string(), mirror, url.clone());
        let handle = Arc::new(Mutex::new(task.clone()));
        self.tasks.insert(version.to_string(), Arc::clone(&handle));

        self.events.emit_download(DownloadEvent::Started {
            version: version.to_string(),
            mirror: mirror.to_string(),
            url: url.clone(),
        });

        let filename = fleet_types::Package::filename_for(&self.engine, version);
        let dest = self.cache_dir.join(&filename);
        let temp = self.cache_dir.join(format!("{filename}.tmp"));

        let result = self.stream_to_temp(version, &url, &temp, &handle).await;

        match result {
            Ok(total_bytes) => {
                tokio::fs::create_dir_all(&self.cache_dir)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &self.cache_dir))?;
                fleet_archive::move_or_copy(&temp, &dest).await?;

                let mut t = handle.lock().await;
                t.status = DownloadStatus::Completed;
                t.progress = 100;
                t.downloaded_bytes = total_bytes;
                t.end_time = Some(Utc::now());
                self.events.emit_download(DownloadEvent::Completed {
                    version: version.to_string(),
                    total_bytes,
                });
            }
            Err(ref e) if matches!(e, Error::Network(NetworkError::Cancelled { .. })) => {
                let _ = tokio::fs::remove_file(&temp).await;
                let mut t = handle.lock().await;
                t.status = DownloadStatus::Cancelled;
                t.end_time = Some(Utc::now());
                self.events.emit_download(DownloadEvent::Cancelled {
                    version: version.to_string(),
                });
            }
            Err(ref e) => {
                let _ = tokio::fs::remove_file(&temp).await;
                let message = e.to_string();
                let mut t = handle.lock().await;
                t.status = DownloadStatus::Failed;
                t.error = Some(message.clone());
                t.end_time = Some(Utc::now());
                self.events.emit_download(DownloadEvent::Failed {
                    version: version.to_string(),
                    error: message,
                });
            }
        }

        if let Err(e) = result {
            return Err(e);
        }

        Ok(handle.lock().await.clone())
    }

    async fn stream_to_temp(
        &self,
        version: &str,
        url: &str,
        temp: &std::path::Path,
        handle: &Arc<Mutex<DownloadTask>>,
    ) -> Result<u64, Error> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.cache_dir))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let total_bytes = response.content_length();
        {
            let mut t = handle.lock().await;
            t.status = DownloadStatus::Downloading;
            t.total_bytes = total_bytes;
        }

        let mut file = tokio::fs::File::create(temp)
            .await
            .map_err(|e| Error::io_with_path(&e, temp))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut tracker = ProgressTracker::new(total_bytes);

        while let Some(chunk) = stream.next().await {
            {
                let t = handle.lock().await;
                if t.status == DownloadStatus::Cancelled {
                    return Err(NetworkError::Cancelled {
                        version: version.to_string(),
                    }
                    .into());
                }
            }

            let bytes = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| Error::io_with_path(&e, temp))?;
            downloaded += bytes.len() as u64;

            if let Some(sample) = tracker.sample(downloaded, false) {
                let mut t = handle.lock().await;
                t.progress = sample.progress;
                t.downloaded_bytes = sample.downloaded_bytes;
                t.speed_bps = sample.speed_bps;
                drop(t);
                self.events.emit_download(DownloadEvent::Progress {
                    version: version.to_string(),
                    downloaded_bytes: sample.downloaded_bytes,
                    total_bytes,
                    speed_bps: sample.speed_bps,
                });
            }
        }

        file.flush().await.map_err(|e| Error::io_with_path(&e, temp))?;
        Ok(downloaded)
    }

    /// Returns the current task for `version`, if any has been started.
    pub async fn status(&self, version: &str) -> Option<DownloadTask> {
        if let Some(entry) = self.tasks.get(version) {
            return Some(entry.lock().await.clone());
        }
        None
    }

    /// Marks the in-flight task for `version` cancelled. The streaming
    /// loop observes this on its next chunk and unwinds, cleaning up
    /// its temp file.
    ///
    /// # Errors
    /// Returns `NetworkError::TaskNotFound` if no non-terminal task
    /// exists for `version`.
    pub async fn cancel(&self, version: &str) -> Result<(), Error> {
        let Some(entry) = self.tasks.get(version) else {
            return Err(NetworkError::TaskNotFound {
                version: version.to_string(),
            }
            .into());
        };
        let mut task = entry.lock().await;
        if task.status.is_terminal() {
            return Err(NetworkError::TaskNotFound {
                version: version.to_string(),
            }
            .into());
        }
        task.status = DownloadStatus::Cancelled;
        Ok(())
    }

    /// Lists all tasks known to this downloader, most recently started first.
    pub async fn list(&self) -> Vec<DownloadTask> {
        let mut tasks = Vec::with_capacity(self.tasks.len());
        for entry in self.tasks.iter() {
            tasks.push(entry.value().lock().await.clone());
        }
        tasks.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_unknown_version_is_task_not_found() {
        let (tx, _rx) = fleet_events::channel();
        let dir = tempfile::tempdir().unwrap();
        let downloader = MirrorDownloader::new("seatunnel", dir.path(), tx);
        let err = downloader.cancel("9.9.9").await.unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::TaskNotFound { .. })));
    }

    #[tokio::test]
    async fn status_of_unknown_version_is_none() {
        let (tx, _rx) = fleet_events::channel();
        let dir = tempfile::tempdir().unwrap();
        let downloader = MirrorDownloader::new("seatunnel", dir.path(), tx);
        assert!(downloader.status("9.9.9").await.is_none());
    }
}
