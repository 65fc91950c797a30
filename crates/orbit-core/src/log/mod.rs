//! Durable per-session event logs.
//!
//! Each session name addresses one independent, append-only stream with a
//! strict total order. There is no cross-session ordering, no update, and no
//! per-event delete; [`EventLog::purge`] drops a whole session.
//!
//! Errors are returned to the caller untouched. The log never retries.

pub mod file;
pub mod memory;

pub use file::FileLog;
pub use memory::MemoryLog;

use std::io;
use std::time::{Duration, Instant};

use crate::error::ErrorCode;
use crate::event::Event;
use crate::lock::LockError;

/// Longest accepted session name.
pub const MAX_SESSION_NAME_LEN: usize = 64;

/// Errors raised by a log backend.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// I/O error reading or writing a session file.
    #[error("log I/O error: {0}")]
    Io(#[from] io::Error),

    /// Lock acquisition failed.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// A stored record could not be parsed.
    #[error("corrupt record in session '{session}' at line {line}: {reason}")]
    Corrupt {
        session: String,
        line: usize,
        reason: String,
    },

    /// An event could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The caller's deadline passed before the operation finished.
    #[error("log operation timed out after {waited:?}")]
    Timeout { waited: Duration },

    /// The session name is not a safe routing key.
    #[error("invalid session name '{name}': {reason}")]
    InvalidSession { name: String, reason: &'static str },
}

impl LogError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::Encode(_) => ErrorCode::LogWriteFailed,
            Self::Lock(err) => err.code(),
            Self::Corrupt { .. } => ErrorCode::CorruptLog,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::InvalidSession { .. } => ErrorCode::InvalidSessionName,
        }
    }
}

/// A point in time after which deadline-aware operations give up.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Expire `timeout` from now. A zero timeout is already expired.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(timeout),
        }
    }

    /// Never expire.
    #[must_use]
    pub fn none() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    /// # Errors
    ///
    /// Returns [`LogError::Timeout`] once the deadline has passed.
    pub fn check(&self) -> Result<(), LogError> {
        if self.is_expired() {
            Err(LogError::Timeout {
                waited: self.started.elapsed(),
            })
        } else {
            Ok(())
        }
    }
}

/// An embeddable append log with one ordered stream per session.
pub trait EventLog: Send + Sync {
    /// Append `event` to `session`, returning its 1-based sequence number.
    /// Durable on success.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] on invalid session names, lock, I/O, or encoding
    /// failure.
    fn append(&self, session: &str, event: &Event) -> Result<u64, LogError>;

    /// Every event of `session`, first appended to last, giving up once
    /// `deadline` passes. An unknown session is empty.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] on I/O failure, corrupt records, or timeout.
    fn replay_until(&self, session: &str, deadline: Deadline) -> Result<Vec<Event>, LogError>;

    /// Every event of `session`, first appended to last.
    ///
    /// # Errors
    ///
    /// See [`EventLog::replay_until`].
    fn replay(&self, session: &str) -> Result<Vec<Event>, LogError> {
        self.replay_until(session, Deadline::none())
    }

    /// Irreversibly delete every event of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] on invalid session names, lock, or I/O failure.
    fn purge(&self, session: &str) -> Result<(), LogError>;

    /// Names of all known sessions, sorted, giving up once `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the backing store cannot be listed, or on
    /// timeout.
    fn sessions_until(&self, deadline: Deadline) -> Result<Vec<String>, LogError>;

    /// Names of all known sessions, sorted.
    ///
    /// # Errors
    ///
    /// See [`EventLog::sessions_until`].
    fn sessions(&self) -> Result<Vec<String>, LogError> {
        self.sessions_until(Deadline::none())
    }
}

/// Check that `name` is usable as a routing key: non-empty, at most
/// [`MAX_SESSION_NAME_LEN`] characters, ASCII alphanumerics, `-` and `_`.
///
/// # Errors
///
/// Returns [`LogError::InvalidSession`] describing the first violation.
pub fn validate_session_name(name: &str) -> Result<(), LogError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.len() > MAX_SESSION_NAME_LEN {
        Some("must be at most 64 characters")
    } else if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        Some("may only contain ASCII letters, digits, '-' and '_'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LogError::InvalidSession {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
