use crate::error::{Result, SnapError};
use crate::utils::permissions::make_writable;
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Chunk size used when comparing file contents
const COMPARE_BUFFER_SIZE: usize = 64 * 1024;

/// Pause before the second directory creation attempt
const RETRY_DELAY: Duration = if cfg!(test) {
    Duration::from_millis(100)
} else {
    Duration::from_secs(2)
};

/// Remove `path` and everything below it. A missing path counts as success.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Create `path` and its parents, retrying once after a short delay.
///
/// # Errors
///
/// Returns [`SnapError::DirectoryCreation`] if the second attempt fails too.
pub fn create_dir_with_retry(path: &Path) -> Result<()> {
    if fs::create_dir_all(path).is_ok() {
        return Ok(());
    }

    warn!(path = %path.display(), "Directory creation failed, retrying");
    std::thread::sleep(RETRY_DELAY);

    fs::create_dir_all(path).map_err(|source| SnapError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy `src` to `dst` keeping content, permissions and timestamps.
///
/// The destination never ends up read-only, so the next wipe can delete it.
///
/// # Errors
///
/// Returns an error if the copy fails or the metadata cannot be applied.
pub fn copy_preserving(src: &Path, dst: &Path) -> io::Result<u64> {
    if dst.exists() {
        make_writable(dst)?;
    }

    let bytes = fs::copy(src, dst)?;
    make_writable(dst)?;

    let metadata = fs::metadata(src)?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    Ok(bytes)
}

/// Byte-for-byte comparison of two files.
///
/// # Errors
///
/// Returns an error if either file cannot be opened or read.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let file_a = File::open(a)?;
    let file_b = File::open(b)?;

    if file_a.metadata()?.len() != file_b.metadata()?.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(COMPARE_BUFFER_SIZE, file_a);
    let mut reader_b = BufReader::with_capacity(COMPARE_BUFFER_SIZE, file_b);

    loop {
        let chunk_a = reader_a.fill_buf()?;
        let chunk_b = reader_b.fill_buf()?;

        if chunk_a.is_empty() || chunk_b.is_empty() {
            return Ok(chunk_a.is_empty() && chunk_b.is_empty());
        }

        let len = chunk_a.len().min(chunk_b.len());
        if chunk_a[..len] != chunk_b[..len] {
            return Ok(false);
        }

        reader_a.consume(len);
        reader_b.consume(len);
    }
}
