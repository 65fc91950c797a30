//! Event data model for the orbit session log.
//!
//! [`Event`] is the immutable wire record appended to a session log:
//!
//! ```text
//! {"id": ..., "timestamp": ..., "session": ..., "type": ..., "action": ..., "data": ..., "meta": {...}}
//! ```
//!
//! `type` and `action` stay free strings on the wire so that a log written by
//! a newer build still deserializes here. Interpretation happens through
//! [`DomainEvent::decode`], which maps every (type, action) pair this build
//! knows to a typed variant.

pub mod domain;
pub mod types;

pub use domain::{DecodeError, DomainEvent};
pub use types::{EventType, UnknownEventType};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side-channel fields specific to an action, kept as a generic JSON object.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A single event in a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Producer-assigned identifier (note/task/message ID). May be empty.
    #[serde(default)]
    pub id: String,

    /// Producer-assigned creation time.
    pub timestamp: DateTime<Utc>,

    /// The session this event belongs to.
    #[serde(default)]
    pub session: String,

    /// Coarse category: note, task, iteration, inbox, session.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Verb within the type: add, content, delete, mark_read, start, ...
    pub action: String,

    /// Primary payload: free text or an identifier.
    #[serde(default)]
    pub data: String,

    /// Action-specific fields.
    #[serde(default)]
    pub meta: Meta,
}

impl Event {
    /// The known category of this event, if any.
    #[must_use]
    pub fn kind(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }

    /// Interpret this record as a typed domain event.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for unknown type/action pairs and for known
    /// pairs whose payload does not match the expected shape.
    pub fn decode(&self) -> Result<DomainEvent, DecodeError> {
        DomainEvent::decode(self)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.data.chars().take(40).collect();
        let ellipsis = if self.data.chars().count() > 40 { "..." } else { "" };
        write!(
            f,
            "{}\t{}\t{}/{}\t{}\t{preview}{ellipsis}",
            self.timestamp.to_rfc3339(),
            self.session,
            self.event_type,
            self.action,
            if self.id.is_empty() { "-" } else { self.id.as_str() },
        )
    }
}
