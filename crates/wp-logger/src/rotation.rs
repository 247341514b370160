//! Size-based rotation of log files.
//!
//! `error.log` is archived as `error.log.1`, older archives shift to `.2`,
//! `.3`, ... and the oldest (`.max_files`) is dropped.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

fn archive_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

async fn rename_if_exists(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Rotate `path` if it is larger than `max_file_size` bytes.
///
/// Returns whether a rotation happened. A missing file is not rotated. With
/// `max_files == 0` the file is truncated without keeping an archive.
pub async fn rotate_if_needed(path: &Path, max_file_size: u64, max_files: u32) -> io::Result<bool> {
    let size = match fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= max_file_size {
        return Ok(false);
    }

    if max_files > 0 {
        remove_if_exists(&archive_path(path, max_files)).await?;
        for index in (1..max_files).rev() {
            rename_if_exists(&archive_path(path, index), &archive_path(path, index + 1)).await?;
        }
        fs::copy(path, archive_path(path, 1)).await?;
    }

    fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .await?;

    Ok(true)
}
