#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Local directory cache of downloaded engine packages
//!
//! Holds `apache-<engine>-<version>-bin.tar.gz` files and answers
//! list/info/upload/delete by version. Writes are always temp-file then
//! rename, so a reader never observes a partially written package.

use fleet_archive::sha256_file;
use fleet_errors::{Error, InstallError};
use fleet_types::Package;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct PackageCache {
    engine: String,
    dir: PathBuf,
}

impl PackageCache {
    #[must_use]
    pub fn new(engine: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
            dir: dir.into(),
        }
    }

    #[must_use]
    pub fn path_for(&self, version: &str) -> PathBuf {
        self.dir.join(Package::filename_for(&self.engine, version))
    }

    /// Scans the cache directory for files matching the canonical
    /// `apache-<engine>-<version>-bin.tar.gz` pattern.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<Package>, Error> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.dir))?;

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.dir))?;
        let mut packages = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, &self.dir))?
        {
            let filename = entry.file_name().to_string_lossy().into_owned();
            let Some(version) = Package::parse_version_from_filename(&self.engine, &filename)
            else {
                continue;
            };
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| Error::io_with_path(&e, entry.path()))?;
            packages.push(Package {
                version,
                filename,
                size: metadata.len(),
                sha256: String::new(),
                local_path: Some(entry.path()),
                uploaded_at: None,
                mirror_urls: std::collections::HashMap::new(),
            });
        }

        Ok(packages)
    }

    /// Returns metadata for `version`, computing its SHA-256 on demand.
    ///
    /// # Errors
    /// Returns `InstallError::PackageNotFound` if the file is absent.
    pub async fn info(&self, version: &str) -> Result<Package, Error> {
        let path = self.path_for(version);
        let metadata = fs::metadata(&path).await.map_err(|_| {
            Error::Install(InstallError::PackageNotFound {
                version: version.to_string(),
            })
        })?;
        let sha256 = sha256_file(&path).await?;
        Ok(Package {
            version: version.to_string(),
            filename: Package::filename_for(&self.engine, version),
            size: metadata.len(),
            sha256,
            local_path: Some(path),
            uploaded_at: None,
            mirror_urls: std::collections::HashMap::new(),
        })
    }

    #[must_use]
    pub async fn contains(&self, version: &str) -> bool {
        fs::metadata(self.path_for(version)).await.is_ok()
    }

    /// Streams `data` to the cache path for `version`, replacing any
    /// existing file, via temp-file-then-rename.
    ///
    /// # Errors
    /// Returns an error if the write or rename fails.
    pub async fn upload(&self, version: &str, data: &[u8]) -> Result<Package, Error> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.dir))?;

        let dest = self.path_for(version);
        let temp = dest.with_extension("tar.gz.tmp");

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| Error::io_with_path(&e, &temp))?;
        file.write_all(data)
            .await
            .map_err(|e| Error::io_with_path(&e, &temp))?;
        file.flush().await.map_err(|e| Error::io_with_path(&e, &temp))?;
        drop(file);

        fleet_archive::move_or_copy(&temp, &dest).await?;

        self.info(version).await
    }

    /// Removes the cached file for `version`.
    ///
    /// # Errors
    /// Returns `InstallError::PackageNotFound` if no such file exists.
    pub async fn delete(&self, version: &str) -> Result<(), Error> {
        let path = self.path_for(version);
        fs::remove_file(&path).await.map_err(|_| {
            Error::Install(InstallError::PackageNotFound {
                version: version.to_string(),
            })
        })
    }
}

#[must_use]
pub fn cache_dir_default() -> PathBuf {
    Path::new("/var/lib/fleetd/packages").to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upload_list_info_delete_round_trip() {
        let dir = tempdir().unwrap();
        let cache = PackageCache::new("seatunnel", dir.path());

        cache.upload("2.3.12", b"fake tarball bytes").await.unwrap();
        let packages = cache.list().await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version, "2.3.12");

        let info = cache.info("2.3.12").await.unwrap();
        assert!(!info.sha256.is_empty());

        cache.delete("2.3.12").await.unwrap();
        assert!(!cache.contains("2.3.12").await);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let cache = PackageCache::new("seatunnel", dir.path());
        let err = cache.delete("9.9.9").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::PackageNotFound { .. })
        ));
    }
}
