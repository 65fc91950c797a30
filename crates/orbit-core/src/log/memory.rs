//! In-process log for tests and embedding.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{Deadline, EventLog, LogError, validate_session_name};
use crate::event::Event;

/// Volatile [`EventLog`] keeping every session in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    sessions: Mutex<BTreeMap<String, Vec<Event>>>,
    fail_appends: AtomicBool,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail with an I/O error until reset.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Number of events stored for `session`.
    #[must_use]
    pub fn len(&self, session: &str) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .map_or(0, Vec::len)
    }
}

impl EventLog for MemoryLog {
    fn append(&self, session: &str, event: &Event) -> Result<u64, LogError> {
        validate_session_name(session)?;
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(LogError::Io(io::Error::other("injected append failure")));
        }

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let events = sessions.entry(session.to_string()).or_default();
        events.push(event.clone());
        Ok(events.len() as u64)
    }

    fn replay_until(&self, session: &str, deadline: Deadline) -> Result<Vec<Event>, LogError> {
        validate_session_name(session)?;
        deadline.check()?;
        Ok(self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
            .unwrap_or_default())
    }

    fn purge(&self, session: &str) -> Result<(), LogError> {
        validate_session_name(session)?;
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session);
        Ok(())
    }

    fn sessions_until(&self, deadline: Deadline) -> Result<Vec<String>, LogError> {
        deadline.check()?;
        Ok(self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(data: &str) -> Event {
        Event {
            id: String::new(),
            timestamp: Utc::now(),
            session: "s".into(),
            event_type: "inbox".into(),
            action: "add".into(),
            data: data.into(),
            meta: serde_json::Map::new(),
        }
    }

    #[test]
    fn sequences_are_dense_per_session() {
        let log = MemoryLog::new();
        assert_eq!(log.append("a", &event("1")).unwrap(), 1);
        assert_eq!(log.append("a", &event("2")).unwrap(), 2);
        assert_eq!(log.append("b", &event("1")).unwrap(), 1);
        assert_eq!(log.len("a"), 2);
        assert_eq!(log.sessions().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn injected_failure_stores_nothing() {
        let log = MemoryLog::new();
        log.fail_appends(true);
        assert!(matches!(log.append("a", &event("x")), Err(LogError::Io(_))));
        assert_eq!(log.len("a"), 0);

        log.fail_appends(false);
        assert_eq!(log.append("a", &event("x")).unwrap(), 1);
    }

    #[test]
    fn purge_forgets_session() {
        let log = MemoryLog::new();
        log.append("a", &event("x")).unwrap();
        log.purge("a").unwrap();
        assert!(log.replay("a").unwrap().is_empty());
        assert!(log.sessions().unwrap().is_empty());
    }
}
