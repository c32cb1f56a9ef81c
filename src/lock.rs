//! Exclusive repository locking for `sync` and `compare`.
//!
//! The lock is an advisory `fs4` lock on a sibling file `<repo_root>.lock`, so
//! wiping the repository never deletes the lock it is holding. Locks are
//! released when dropped.

use crate::error::{Result, SnapError};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

/// Operations that mutate the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Sync,
    Compare,
}

impl OperationType {
    /// Get the string representation of the operation type
    const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Compare => "compare",
        }
    }
}

/// Holds an exclusive lock on a repository
///
/// The lock is automatically released when this struct is dropped.
#[derive(Debug)]
pub struct RepositoryLock {
    lock_file: File,
    lock_path: PathBuf,
}

impl RepositoryLock {
    /// Acquire the lock at `lock_path`, waiting a bounded time for a holder to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create the lock file
    /// - Another invocation holds the lock for longer than the timeout
    pub fn acquire(lock_path: &Path, operation: OperationType) -> Result<Self> {
        // Use shorter timeouts in test mode for faster test execution
        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(30)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Opened without truncation so a waiting process never clobbers the holder's info
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock_path)
            .map_err(|e| {
                SnapError::Lock(format!(
                    "Failed to create lock file {}: {e}",
                    lock_path.display()
                ))
            })?;

        let start = Instant::now();

        loop {
            match file.try_lock_exclusive() {
                Ok(true) => {
                    Self::write_holder_info(&file, operation);
                    debug!(lock = %lock_path.display(), operation = operation.as_str(), "Lock acquired");
                    return Ok(Self {
                        lock_file: file,
                        lock_path: lock_path.to_path_buf(),
                    });
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    return Err(SnapError::Lock(format!(
                        "Another operation is using this repository; {} gave up after {}. \
                         Lock file: {}",
                        operation.as_str(),
                        humantime::format_duration(lock_timeout),
                        lock_path.display()
                    )));
                }
            }
        }
    }

    fn write_holder_info(file: &File, operation: OperationType) {
        let mut file_ref = file;
        let _ = file_ref.set_len(0);
        let _ = writeln!(
            file_ref,
            "operation={}\npid={}\ntime={}",
            operation.as_str(),
            std::process::id(),
            humantime::format_rfc3339(SystemTime::now())
        );
    }
}

impl Drop for RepositoryLock {
    fn drop(&mut self) {
        // The file stays on disk; removing it would race with a waiting process
        let _ = FileExt::unlock(&self.lock_file);
        debug!(lock = %self.lock_path.display(), "Lock released");
    }
}
