//! SHA-256/SHA-1 digests over files and byte streams

use fleet_errors::Error;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Streams `path` through a SHA-256 hasher, returning the lowercase hex digest.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub async fn sha256_file(path: &Path) -> Result<String, Error> {
    let mut file = File::open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Streams `path` through a SHA-1 hasher, returning the lowercase hex digest.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub async fn sha1_file(path: &Path) -> Result<String, Error> {
    let mut file = File::open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Case-insensitive, whitespace-trimming digest comparison, per the
/// checksum round-trip invariant: any byte sequence's own digest always
/// verifies, and any digest that differs (after normalization) is rejected.
#[must_use]
pub fn digests_match(computed: &str, expected: &str) -> bool {
    computed.trim().eq_ignore_ascii_case(expected.trim())
}

/// Computes a file's SHA-256 and compares it against `expected`.
///
/// # Errors
/// Returns an `integrity` error if the digests do not match, or an I/O
/// error if the file cannot be read.
pub async fn verify_sha256(path: &Path, expected: &str) -> Result<(), Error> {
    let actual = sha256_file(path).await?;
    if digests_match(&actual, expected) {
        Ok(())
    } else {
        Err(fleet_errors::InstallError::IntegrityFailed {
            message: format!(
                "checksum mismatch for {}: expected {expected}, got {actual}",
                path.display()
            ),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    async fn write_temp(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.bin");
        let mut f = tokio::fs::File::create(&path).await.unwrap();
        f.write_all(bytes).await.unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn sha256_round_trips() {
        let (_dir, path) = write_temp(b"hello world").await;
        let digest = sha256_file(&path).await.unwrap();
        verify_sha256(&path, &digest).await.unwrap();
        verify_sha256(&path, &digest.to_uppercase()).await.unwrap();
        verify_sha256(&path, &format!("  {digest}\n")).await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_digest_is_rejected() {
        let (_dir, path) = write_temp(b"hello world").await;
        let bad = "0".repeat(64);
        let err = verify_sha256(&path, &bad).await.unwrap_err();
        assert!(matches!(
            err,
            fleet_errors::Error::Install(fleet_errors::InstallError::IntegrityFailed { .. })
        ));
    }
}
