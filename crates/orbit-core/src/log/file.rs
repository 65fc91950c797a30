//! File-backed session logs.
//!
//! # Directory layout
//!
//! ```text
//! <data_dir>/
//!   sessions/
//!     <name>.events   # JSON lines, one stored record per line
//!     <name>.lock     # per-session advisory lock
//! ```
//!
//! # Format
//!
//! Each file starts with the header line `# orbit session log v1`. Every
//! other non-blank, non-comment line is a stored record: the event's wire
//! fields plus a log-assigned `seq`, 1-based and dense.
//!
//! # Concurrency
//!
//! Appends and purges hold an exclusive lock on `<name>.lock`. Each append
//! uses `O_APPEND` + `write_all` + `flush`, with `sync_data` when durable.
//! Readers take no lock; a line without its trailing `\n` is an in-flight or
//! torn write and is ignored on replay, then truncated by the next append.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Deadline, EventLog, LogError, validate_session_name};
use crate::event::Event;
use crate::lock::SessionLock;

/// First line of every session file.
pub const LOG_HEADER: &str = "# orbit session log v1";

const EVENTS_EXT: &str = "events";
const LOCK_EXT: &str = "lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A persisted event with its position in the session log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Serialize)]
struct StoredRecordRef<'a> {
    seq: u64,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Deserialize)]
struct SeqOnly {
    seq: u64,
}

/// One JSON-lines file per session under a data directory.
#[derive(Debug, Clone)]
pub struct FileLog {
    sessions_dir: PathBuf,
    durable: bool,
    lock_timeout: Duration,
}

impl FileLog {
    /// Create a log rooted at `data_dir`. Nothing is written until the first
    /// append.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            sessions_dir: data_dir.as_ref().join("sessions"),
            durable: true,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Whether appends call `sync_data` before returning.
    #[must_use]
    pub const fn with_durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// How long an append or purge waits for the session lock.
    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    /// Path to the events file for `session`.
    #[must_use]
    pub fn session_path(&self, session: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session}.{EVENTS_EXT}"))
    }

    /// Path to the advisory lock file for `session`.
    #[must_use]
    pub fn lock_path(&self, session: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session}.{LOCK_EXT}"))
    }

    /// Read every stored record of `session`, enforcing dense sequence
    /// numbers.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Corrupt`] for unparseable lines or sequence gaps,
    /// [`LogError::Timeout`] once `deadline` passes, and [`LogError::Io`] on
    /// read failure.
    pub fn records(&self, session: &str, deadline: Deadline) -> Result<Vec<StoredRecord>, LogError> {
        validate_session_name(session)?;
        deadline.check()?;

        let content = match fs::read_to_string(self.session_path(session)) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for (idx, line) in complete_lines(&content).enumerate() {
            if idx % 256 == 0 {
                deadline.check()?;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let record: StoredRecord =
                serde_json::from_str(trimmed).map_err(|err| LogError::Corrupt {
                    session: session.to_string(),
                    line: idx + 1,
                    reason: err.to_string(),
                })?;

            let expected = records.len() as u64 + 1;
            if record.seq != expected {
                return Err(LogError::Corrupt {
                    session: session.to_string(),
                    line: idx + 1,
                    reason: format!("expected seq {expected}, found {}", record.seq),
                });
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Truncate a partial trailing line left by an interrupted append.
    ///
    /// Takes the session lock, so it never races a live writer. Returns the
    /// number of bytes removed, or `None` if the file was clean or absent.
    ///
    /// # Errors
    ///
    /// [`LogError::Lock`] if the lock stays busy, [`LogError::Io`] if the
    /// file cannot be read or truncated, [`LogError::Corrupt`] if the last
    /// complete record is unreadable.
    pub fn recover_torn_write(&self, session: &str) -> Result<Option<u64>, LogError> {
        validate_session_name(session)?;
        let held = SessionLock::acquire(&self.lock_path(session), self.lock_timeout)?;
        Ok(self.repair_tail(session, &held)?.truncated)
    }

    /// One read of the session file under `_held`: drop any torn tail and
    /// report the last stored `seq`.
    fn repair_tail(&self, session: &str, _held: &SessionLock) -> Result<Tail, LogError> {
        let path = self.session_path(session);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Tail::default()),
            Err(err) => return Err(err.into()),
        };

        let keep = content
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);

        let truncated = if keep < content.len() {
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(keep as u64)?;
            let removed = (content.len() - keep) as u64;
            warn!(session, truncated = removed, "truncated torn write in session log");
            Some(removed)
        } else {
            None
        };

        Ok(Tail {
            truncated,
            last_seq: last_seq(session, &content[..keep])?,
        })
    }
}

#[derive(Debug, Default)]
struct Tail {
    truncated: Option<u64>,
    last_seq: u64,
}

/// Sequence number of the last record in `complete`, or 0.
fn last_seq(session: &str, complete: &[u8]) -> Result<u64, LogError> {
    let lines: Vec<&[u8]> = complete.split(|&b| b == b'\n').collect();
    for (idx, line) in lines.iter().enumerate().rev() {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            continue;
        }
        let parsed: SeqOnly = serde_json::from_slice(trimmed).map_err(|err| LogError::Corrupt {
            session: session.to_string(),
            line: idx + 1,
            reason: err.to_string(),
        })?;
        return Ok(parsed.seq);
    }
    Ok(0)
}

impl EventLog for FileLog {
    fn append(&self, session: &str, event: &Event) -> Result<u64, LogError> {
        validate_session_name(session)?;
        fs::create_dir_all(&self.sessions_dir)?;

        let held = SessionLock::acquire(&self.lock_path(session), self.lock_timeout)?;
        let seq = self.repair_tail(session, &held)?.last_seq + 1;

        let mut line = serde_json::to_string(&StoredRecordRef { seq, event })?;
        line.push('\n');

        let path = self.session_path(session);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(LOG_HEADER.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.write_all(line.as_bytes())?;
        file.flush()?;

        if self.durable {
            file.sync_data()?;
        }

        debug!(
            session,
            seq,
            event_type = %event.event_type,
            action = %event.action,
            "appended event"
        );
        Ok(seq)
    }

    fn replay_until(&self, session: &str, deadline: Deadline) -> Result<Vec<Event>, LogError> {
        Ok(self
            .records(session, deadline)?
            .into_iter()
            .map(|record| record.event)
            .collect())
    }

    fn purge(&self, session: &str) -> Result<(), LogError> {
        validate_session_name(session)?;
        if !self.sessions_dir.exists() {
            return Ok(());
        }

        let _lock = SessionLock::acquire(&self.lock_path(session), self.lock_timeout)?;
        match fs::remove_file(self.session_path(session)) {
            Ok(()) => {
                info!(session, "purged session log");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn sessions_until(&self, deadline: Deadline) -> Result<Vec<String>, LogError> {
        deadline.check()?;

        let entries = match fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            deadline.check()?;
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EVENTS_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_session_name(stem).is_ok() {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Lines terminated by `\n`. A trailing fragment without one is dropped.
fn complete_lines(content: &str) -> impl Iterator<Item = &str> {
    let end = content.rfind('\n').map_or(0, |pos| pos + 1);
    content[..end].lines()
}
