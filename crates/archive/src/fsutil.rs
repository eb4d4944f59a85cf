//! File move-or-copy across devices

use fleet_errors::Error;
use std::path::Path;
use tokio::fs;

/// Moves `src` to `dest`, falling back to copy-then-remove when `src` and
/// `dest` live on different devices (where `rename` fails with `EXDEV`).
///
/// # Errors
/// Returns an error if neither rename nor copy succeeds.
pub async fn move_or_copy(src: &Path, dest: &Path) -> Result<(), Error> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(&e, parent))?;
    }

    match fs::rename(src, dest).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            fs::copy(src, dest)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
            fs::remove_file(src).await.map_err(|e| Error::io_with_path(&e, src))?;
            Ok(())
        }
        Err(e) => Err(Error::io_with_path(&e, dest)),
    }
}

fn is_cross_device(err: &std::io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc_exdev())
    }
    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}

#[cfg(unix)]
const fn libc_exdev() -> i32 {
    18 // EXDEV on Linux and macOS
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn moves_file_within_same_device() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("nested/dest.bin");
        tokio::fs::write(&src, b"payload").await.unwrap();

        move_or_copy(&src, &dest).await.unwrap();

        assert!(!src.exists());
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"payload");
    }
}
