//! Validated domain operations over one session log.
//!
//! Every command follows the same shape: validate the parameters, replay the
//! session when a precondition or an ID allocation needs current state,
//! build a [`DomainEvent`], append it, and return the client-visible result.
//! Validation, not-found and ambiguous failures return before the append, so
//! a failing command never changes the log.
//!
//! Sequential IDs are allocated by replay-then-append. Two writers on the
//! same session can allocate the same ID; the reducer keeps the later event.

mod inbox;
mod iterations;
mod notes;
mod session;
mod tasks;

pub use session::{SessionSummary, list_sessions, reset_session};

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::event::{DomainEvent, Event};
use crate::log::{EventLog, validate_session_name};
use crate::state::State;

/// Facade over a single session of an [`EventLog`].
///
/// Holds no cached state; every read replays the log.
#[derive(Clone)]
pub struct Store {
    log: Arc<dyn EventLog>,
    session: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Bind `log` to `session`, stamping events with `clock`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `session` is not a valid session name.
    pub fn new(
        log: Arc<dyn EventLog>,
        session: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let session = session.into();
        validate_session_name(&session)?;
        Ok(Self {
            log,
            session,
            clock,
        })
    }

    /// Like [`Store::new`] with a [`SystemClock`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if `session` is not a valid session name.
    pub fn with_system_clock(
        log: Arc<dyn EventLog>,
        session: impl Into<String>,
    ) -> Result<Self, StoreError> {
        Self::new(log, session, Arc::new(SystemClock::new()))
    }

    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Replay the whole session into a fresh [`State`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the log cannot be read.
    pub fn load_state(&self) -> Result<State, StoreError> {
        let events = self.log.replay(&self.session)?;
        Ok(State::replay(&events))
    }

    fn append(&self, event: DomainEvent) -> Result<Event, StoreError> {
        let wire = event.into_event(&self.session, self.clock.now());
        let seq = self.log.append(&self.session, &wire)?;
        debug!(
            session = %self.session,
            seq,
            event_type = %wire.event_type,
            action = %wire.action,
            "recorded event"
        );
        Ok(wire)
    }
}

/// Reject empty or whitespace-only text. The value itself is kept verbatim.
fn require_text(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        Err(StoreError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_iteration_number(number: u32) -> Result<(), StoreError> {
    if number == 0 {
        Err(StoreError::validation("iteration", "numbers start at 1"))
    } else {
        Ok(())
    }
}
