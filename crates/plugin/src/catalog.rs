//! Plugin catalog: alias resolution, download-to-cache, install bookkeeping (§4.10)

use dashmap::DashMap;
use fleet_agent_exec::resolve_artifact_id;
use fleet_errors::{Error, PluginError};
use fleet_events::{EventEmitter, EventSender, PluginEvent};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Default Maven group path used when a request doesn't override
/// `connectors.repo`.
const DEFAULT_REPO: &str = "https://repo1.maven.org/maven2/org/apache/seatunnel";

#[must_use]
fn artifact_url(repo: Option<&str>, artifact: &str, version: &str) -> String {
    let base = repo.unwrap_or(DEFAULT_REPO);
    format!("{base}/{artifact}/{version}/{artifact}-{version}.jar")
}

/// Resolves plugin names, fetches connector jars into a local cache,
/// and tracks which `(cluster_id, plugin)` pairs have already been
/// recorded as installed.
pub struct PluginCatalog {
    cache_dir: PathBuf,
    client: reqwest::Client,
    events: EventSender,
    installed: DashMap<(String, String), ()>,
}

impl PluginCatalog {
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, events: EventSender) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client: reqwest::Client::new(),
            events,
            installed: DashMap::new(),
        }
    }

    /// Resolves `plugin_name` to its Maven artifact id, emitting
    /// [`PluginEvent::Resolved`].
    #[must_use]
    pub fn resolve(&self, plugin_name: &str) -> String {
        let artifact = resolve_artifact_id(plugin_name);
        self.events.emit_plugin(PluginEvent::Resolved {
            plugin: plugin_name.to_string(),
            artifact: artifact.clone(),
        });
        artifact
    }

    #[must_use]
    pub fn cache_path(&self, artifact: &str, version: &str) -> PathBuf {
        self.cache_dir.join(format!("{artifact}-{version}.jar"))
    }

    /// Downloads `plugin_name`'s jar into the cache if it isn't already
    /// present, returning its cache path either way.
    ///
    /// # Errors
    /// Returns `PluginError::DownloadFailed` if the HTTP fetch or the
    /// final publish fails.
    pub async fn ensure_downloaded(
        &self,
        plugin_name: &str,
        version: &str,
        repo: Option<&str>,
    ) -> Result<PathBuf, Error> {
        let artifact = self.resolve(plugin_name);
        let dest = self.cache_path(&artifact, version);

        if fs::metadata(&dest).await.is_ok() {
            return Ok(dest);
        }

        let url = artifact_url(repo, &artifact, version);
        let download_error = |message: String| -> Error {
            PluginError::DownloadFailed {
                name: plugin_name.to_string(),
                message,
            }
            .into()
        };

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(download_error(format!("{} returned {}", url, response.status())));
        }
        let bytes = response.bytes().await.map_err(|e| download_error(e.to_string()))?;

        let temp = self.cache_dir.join(format!("{artifact}-{version}.jar.tmp"));
        let mut file = fs::File::create(&temp).await.map_err(|e| download_error(e.to_string()))?;
        file.write_all(&bytes).await.map_err(|e| download_error(e.to_string()))?;
        file.flush().await.map_err(|e| download_error(e.to_string()))?;
        drop(file);

        fleet_archive::move_or_copy(&temp, &dest).await?;

        self.events.emit_plugin(PluginEvent::Downloaded {
            plugin: plugin_name.to_string(),
            version: version.to_string(),
        });
        Ok(dest)
    }

    /// Records `plugin` as installed for `cluster_id` if it hasn't been
    /// already. Returns whether this call was the one that recorded it.
    pub fn record_installed(&self, cluster_id: &str, plugin: &str) -> bool {
        let key = (cluster_id.to_string(), plugin.to_string());
        if self.installed.contains_key(&key) {
            return false;
        }
        self.installed.insert(key, ());
        self.events.emit_plugin(PluginEvent::Installed {
            plugin: plugin.to_string(),
            host_id: cluster_id.to_string(),
        });
        true
    }

    #[must_use]
    pub fn is_installed(&self, cluster_id: &str, plugin: &str) -> bool {
        self.installed.contains_key(&(cluster_id.to_string(), plugin.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_url_uses_default_repo_when_unset() {
        let url = artifact_url(None, "connector-cdc-mysql", "2.3.12");
        assert_eq!(
            url,
            "https://repo1.maven.org/maven2/org/apache/seatunnel/connector-cdc-mysql/2.3.12/connector-cdc-mysql-2.3.12.jar"
        );
    }

    #[test]
    fn artifact_url_honors_override() {
        let url = artifact_url(Some("https://internal.example.com/repo"), "connector-jdbc", "2.3.12");
        assert_eq!(url, "https://internal.example.com/repo/connector-jdbc/2.3.12/connector-jdbc-2.3.12.jar");
    }

    #[tokio::test]
    async fn record_installed_is_idempotent() {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let catalog = PluginCatalog::new("/tmp/does-not-matter", events);

        assert!(catalog.record_installed("cluster-1", "mysql-cdc"));
        assert!(!catalog.record_installed("cluster-1", "mysql-cdc"));
        assert!(catalog.is_installed("cluster-1", "mysql-cdc"));
    }

    #[test]
    fn resolve_delegates_to_the_shared_alias_table() {
        let (events, _rx) = fleet_events::channel();
        let catalog = PluginCatalog::new("/tmp/does-not-matter", events);
        assert_eq!(catalog.resolve("mysql-cdc"), "connector-cdc-mysql");
    }
}
