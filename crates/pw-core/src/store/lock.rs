//! Store lock file with backoff retry
//!
//! The run controller holds this lock across the whole load-mutate-save
//! sequence, so two passes against the same store file cannot interleave.

use crate::store::error::StoreError;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Lock guard that automatically releases on drop
pub struct StoreLock {
    #[allow(dead_code)]
    file: File,
    #[cfg(unix)]
    fd: i32,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            unsafe {
                libc::flock(self.fd, libc::LOCK_UN);
            }
        }
    }
}

/// Acquire an exclusive lock on the store's lock file with backoff retry
///
/// Retries with exponential backoff (50ms, 100ms, 200ms, ...) up to
/// `max_retries` attempts. Returns a `StoreLock` guard that releases the
/// lock on drop, or `StoreError::LockTimeout` when another pass holds it
/// for the whole retry window.
pub fn acquire_lock(path: &Path, max_retries: u32) -> Result<StoreLock, StoreError> {
    #[cfg(unix)]
    {
        unix_acquire_lock(path, max_retries)
    }

    #[cfg(not(unix))]
    {
        fallback_acquire_lock(path, max_retries)
    }
}

#[cfg(unix)]
fn unix_acquire_lock(path: &Path, max_retries: u32) -> Result<StoreLock, StoreError> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    let fd = file.as_raw_fd();

    for attempt in 0..=max_retries {
        let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };

        if result == 0 {
            return Ok(StoreLock { file, fd });
        }

        let err = std::io::Error::last_os_error();
        let would_block = err.raw_os_error() == Some(libc::EWOULDBLOCK)
            || err.raw_os_error() == Some(libc::EAGAIN);

        if !would_block {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }

        // EWOULDBLOCK - another pass holds the lock
        if attempt < max_retries {
            let wait_ms = 50u64 * (1 << attempt);
            std::thread::sleep(Duration::from_millis(wait_ms));
        }
    }

    Err(StoreError::LockTimeout {
        path: path.to_path_buf(),
        retries: max_retries,
    })
}

#[cfg(not(unix))]
fn fallback_acquire_lock(path: &Path, max_retries: u32) -> Result<StoreLock, StoreError> {
    use std::fs::OpenOptions;

    // No flock outside unix; file creation stands in as the lock.
    for attempt in 0..=max_retries {
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => {
                return Ok(StoreLock { file });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if attempt < max_retries {
                    let wait_ms = 50u64 * (1 << attempt);
                    std::thread::sleep(Duration::from_millis(wait_ms));
                }
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }
    }

    Err(StoreError::LockTimeout {
        path: path.to_path_buf(),
        retries: max_retries,
    })
}
