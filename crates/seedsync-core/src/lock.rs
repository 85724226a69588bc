// # Run Lock
//
// Lock file guarding against overlapping runs.
//
// ## Purpose
//
// The job is started by an external scheduler. If one run is still waiting on
// a slow provider when the next one starts, both would edit the same inactive
// zone version. Holding the lock for the duration of a run prevents that.
//
// ## Mechanism
//
// The lock is an OS advisory lock taken on the open lock file, not the file's
// existence. The kernel releases it when the holding process exits, crashed
// or not, so a leftover file never blocks a later run and no age heuristic is
// involved. The file itself is never removed; removing it would let a second
// process lock a fresh inode while the first still holds the old one.
//
// ## File Format
//
// Informational only:
//
// ```json
// { "pid": 4242, "acquired_at": "2025-01-09T12:00:00Z" }
// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, TryLockError};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::Error;

/// Contents of the lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Exclusive lock held for the duration of one run
///
/// The lock is released when the value is dropped or the process exits.
///
/// # Example
///
/// ```rust,no_run
/// use seedsync_core::RunLock;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let _lock = RunLock::acquire("/run/seedsync.lock").await?;
///     // ... run the sync ...
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    file: File,
}

impl RunLock {
    /// Acquire the lock without waiting
    ///
    /// # Returns
    ///
    /// - `Ok(RunLock)`: The lock is held until dropped
    /// - `Err(Error::RunLocked)`: Another run holds the lock
    /// - `Err(Error::Io)`: The lock file could not be opened, locked or written
    pub async fn acquire<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?
            .into_std()
            .await;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(Error::RunLocked(format!(
                    "lock file {} is held",
                    path.display()
                )));
            }
            Err(TryLockError::Error(e)) => return Err(Error::Io(e)),
        }

        let mut lock = Self { path, file };
        lock.record_owner()?;

        debug!("Acquired lock file {}", lock.path.display());
        Ok(lock)
    }

    /// Path of the held lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with this process's pid and the acquisition time
    fn record_owner(&mut self) -> Result<(), Error> {
        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let body = serde_json::to_vec(&info)?;

        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&body)?;
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock as well
        if let Err(e) = self.file.unlock() {
            debug!("Unlocking {} failed: {}", self.path.display(), e);
        } else {
            debug!("Released lock file {}", self.path.display());
        }
    }
}
