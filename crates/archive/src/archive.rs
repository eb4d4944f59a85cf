//! gzip+tar extraction with path-traversal defense
//!
//! The extractor strips the first path component of every archive entry
//! (engine tarballs are rooted in a single top-level directory) and
//! rejects any entry whose resolved path would land outside the install
//! directory, without creating that entry. Unsupported entry types
//! (device nodes, FIFOs, ...) are skipped but do not abort extraction.

use fleet_errors::{Error, InstallError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

/// Strips the leading `components` path segments from `path`, returning
/// `None` if nothing is left afterward (i.e. the entry was the root
/// directory itself).
fn strip_leading_components(path: &Path, components: usize) -> Option<PathBuf> {
    let mut iter = path.components();
    for _ in 0..components {
        iter.next()?;
    }
    let rest: PathBuf = iter.collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Resolves `relative` against `install_dir`, rejecting absolute paths,
/// `..` components, and anything else that would climb out of
/// `install_dir`.
fn safe_join(install_dir: &Path, relative: &Path) -> Result<PathBuf, Error> {
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::PathTraversal {
                    path: relative.display().to_string(),
                }
                .into());
            }
        }
    }
    Ok(install_dir.join(relative))
}

/// Extracts a `.tar.gz` archive into `install_dir`, stripping the first
/// path component of each entry. Runs on a blocking thread since the
/// `tar`/`flate2` crates are synchronous.
///
/// # Errors
/// Returns `InstallError::PathTraversal` if an entry resolves outside
/// `install_dir`, or `InstallError::ExtractionFailed` for I/O/format
/// errors. No file is created for a rejected entry.
pub async fn extract_tar_gz(archive_path: &Path, install_dir: &Path) -> Result<usize, Error> {
    let archive_path = archive_path.to_path_buf();
    let install_dir = install_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_tar_gz_blocking(&archive_path, &install_dir))
        .await
        .map_err(|e| {
            Error::Install(InstallError::ExtractionFailed {
                message: format!("extraction task panicked: {e}"),
            })
        })?
}

fn extract_tar_gz_blocking(archive_path: &Path, install_dir: &Path) -> Result<usize, Error> {
    fs::create_dir_all(install_dir).map_err(|e| Error::io_with_path(&e, install_dir))?;

    let file = fs::File::open(archive_path).map_err(|e| Error::io_with_path(&e, archive_path))?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    let mut extracted = 0usize;
    let entries = archive.entries().map_err(|e| InstallError::ExtractionFailed {
        message: format!("corrupted archive: {e}"),
    })?;

    for entry_result in entries {
        let mut entry = entry_result.map_err(|e| InstallError::ExtractionFailed {
            message: format!("corrupted entry: {e}"),
        })?;
        let raw_path = entry
            .path()
            .map_err(|e| InstallError::ExtractionFailed {
                message: format!("invalid entry path: {e}"),
            })?
            .into_owned();

        let Some(relative) = strip_leading_components(&raw_path, 1) else {
            continue;
        };

        let entry_type = entry.header().entry_type();
        if !matches!(entry_type, EntryType::Regular | EntryType::Directory | EntryType::Symlink) {
            continue;
        }

        let target = safe_join(install_dir, &relative)?;

        match entry_type {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| Error::io_with_path(&e, &target))?;
            }
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
                }
                entry
                    .unpack(&target)
                    .map_err(|e| InstallError::ExtractionFailed {
                        message: format!("failed to write {}: {e}", target.display()),
                    })?;
                #[cfg(unix)]
                if let Ok(mode) = entry.header().mode() {
                    use std::os::unix::fs::PermissionsExt;
                    let _ = fs::set_permissions(&target, fs::Permissions::from_mode(mode));
                }
            }
            EntryType::Symlink => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
                }
                let _ = entry.unpack(&target);
            }
            _ => unreachable!("filtered above"),
        }

        extracted += 1;
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        let tar_bytes = builder.into_inner().unwrap();
        let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        gz.write_all(&tar_bytes).unwrap();
        gz.finish().unwrap()
    }

    #[tokio::test]
    async fn extracts_stripping_root_component() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("pkg.tar.gz");
        std::fs::write(
            &archive_path,
            build_archive(&[("engine-1.0/bin/start.sh", b"#!/bin/sh\n")]),
        )
        .unwrap();

        let install_dir = dir.path().join("install");
        let count = extract_tar_gz(&archive_path, &install_dir).await.unwrap();
        assert_eq!(count, 1);
        assert!(install_dir.join("bin/start.sh").exists());
    }

    #[tokio::test]
    async fn rejects_path_traversal_without_writing() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("evil.tar.gz");
        std::fs::write(
            &archive_path,
            build_archive(&[("engine-1.0/../../etc/passwd", b"pwned")]),
        )
        .unwrap();

        let install_dir = dir.path().join("install");
        let result = extract_tar_gz(&archive_path, &install_dir).await;
        assert!(result.is_err());
        assert!(!install_dir.join("etc").exists());
    }
}
