//! Cross-process mutual exclusion scoped to a file path.
//!
//! The lock is an OS advisory exclusive lock on a `<path>.lock` sidecar file.
//! Each acquisition opens its own handle, so two threads of one process
//! exclude each other just like two processes do.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use gardenmap_core::storage::{Result, StorageError};

const POLL_INTERVAL_MIN: Duration = Duration::from_millis(2);
const POLL_INTERVAL_MAX: Duration = Duration::from_millis(50);

/// Named lock for one resource, acquired with a bounded wait.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    timeout: Duration,
}

/// Proof that the lock is held. Released when dropped.
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Creates the lock guarding `resource`. Nothing is touched on disk yet.
    pub fn for_resource(resource: &Path, timeout: Duration) -> Self {
        let mut path = resource.as_os_str().to_owned();
        path.push(".lock");
        Self {
            path: PathBuf::from(path),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the lock is held or the timeout expires.
    ///
    /// Returns `StorageError::Busy` on expiry.
    pub fn acquire(&self) -> Result<FileLockGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| {
                StorageError::Io(format!(
                    "cannot open lock file {}: {e}",
                    self.path.display()
                ))
            })?;

        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut interval = POLL_INTERVAL_MIN;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    tracing::trace!(
                        lock = %self.path.display(),
                        waited_ms = started.elapsed().as_millis() as u64,
                        "File lock acquired"
                    );
                    return Ok(FileLockGuard {
                        file,
                        path: self.path.clone(),
                    });
                }
                Err(e) if is_contended(&e) => {}
                Err(e) => {
                    return Err(StorageError::Io(format!(
                        "cannot lock {}: {e}",
                        self.path.display()
                    )))
                }
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    lock = %self.path.display(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Timed out waiting for file lock"
                );
                return Err(StorageError::Busy(format!(
                    "file lock {} held for more than {}ms",
                    self.path.display(),
                    self.timeout.as_millis()
                )));
            }

            thread::sleep(interval.min(deadline - now));
            interval = (interval * 2).min(POLL_INTERVAL_MAX);
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            // Closing the handle below releases the lock anyway.
            tracing::warn!(lock = %self.path.display(), error = %e, "Failed to unlock file");
        }
    }
}
