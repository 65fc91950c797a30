//! Per-session writer lock.
//!
//! Appends and purges hold an exclusive fs2 lock on `<name>.lock` next to the
//! session file. Readers take no lock: an in-flight append is only visible
//! as a trailing line without `\n`, which replay ignores.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const FIRST_BACKOFF: Duration = Duration::from_millis(2);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("session lock {} still held after {waited:?}", .path.display())]
    Busy { path: PathBuf, waited: Duration },

    #[error("cannot open session lock: {0}")]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Busy { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::LogWriteFailed,
        }
    }
}

/// Held for the duration of one write. Dropping it unlocks.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
}

impl SessionLock {
    /// Take the exclusive lock at `path`, retrying with capped backoff until
    /// `wait` has elapsed. The lock file and its directory are created on
    /// demand and never removed.
    ///
    /// # Errors
    ///
    /// [`LockError::Busy`] when another writer keeps the lock past `wait`.
    pub fn acquire(path: &Path, wait: Duration) -> Result<Self, LockError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        let started = Instant::now();
        let mut backoff = FIRST_BACKOFF;
        while file.try_lock_exclusive().is_err() {
            let waited = started.elapsed();
            if waited >= wait {
                return Err(LockError::Busy {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(backoff.min(wait - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        Ok(Self { file })
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
