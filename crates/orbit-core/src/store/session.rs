use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::Store;
use crate::error::StoreError;
use crate::event::DomainEvent;
use crate::log::{Deadline, EventLog, LogError, validate_session_name};
use crate::state::State;

/// Display summary of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub complete: bool,
    pub tasks_completed: usize,
    pub tasks_total: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

impl SessionSummary {
    fn from_state(name: String, state: &State) -> Self {
        let (tasks_completed, tasks_total) = state.task_progress();
        Self {
            name,
            complete: state.complete,
            tasks_completed,
            tasks_total,
            last_activity: state.last_activity,
        }
    }
}

impl Store {
    /// Mark the session complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the append fails.
    pub fn session_complete(&self) -> Result<(), StoreError> {
        self.append(DomainEvent::SessionCompleted)?;
        info!(session = %self.session, "session completed");
        Ok(())
    }

    /// Flip a completed session back to incomplete, keeping its history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the append fails.
    pub fn session_restart(&self) -> Result<(), StoreError> {
        self.append(DomainEvent::SessionRestarted)?;
        info!(session = %self.session, "session restarted");
        Ok(())
    }
}

/// Irreversibly discard every event of session `name`.
///
/// # Errors
///
/// Validation error for invalid names; log errors verbatim.
pub fn reset_session(log: &dyn EventLog, name: &str) -> Result<(), StoreError> {
    validate_session_name(name)?;
    log.purge(name)?;
    warn!(session = name, "session reset");
    Ok(())
}

/// Replay every known session into a [`SessionSummary`], sorted by name.
///
/// The whole enumeration shares one deadline of `timeout`.
///
/// # Errors
///
/// Returns [`LogError::Timeout`] (wrapped) once the deadline passes, or a
/// log error from enumerating the sessions. A session whose file cannot be
/// replayed is left out of the listing with a warning.
pub fn list_sessions(log: &dyn EventLog, timeout: Duration) -> Result<Vec<SessionSummary>, StoreError> {
    let deadline = Deadline::after(timeout);
    let names = log.sessions_until(deadline)?;

    let mut summaries = Vec::with_capacity(names.len());
    for name in names {
        let events = match log.replay_until(&name, deadline) {
            Ok(events) => events,
            Err(err @ LogError::Timeout { .. }) => return Err(err.into()),
            Err(err) => {
                warn!(session = %name, error = %err, "skipping unreadable session");
                continue;
            }
        };
        let state = State::replay(&events);
        debug!(session = %name, events = events.len(), "summarized session");
        summaries.push(SessionSummary::from_state(name, &state));
    }
    Ok(summaries)
}
