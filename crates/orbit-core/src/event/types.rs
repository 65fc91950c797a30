//! Coarse event categories.
//!
//! The wire record keeps `type` as a free string so that logs written by
//! newer builds still deserialize; this enum is the closed set this build
//! understands.

use std::fmt;
use std::str::FromStr;

/// The five event categories in the orbit event catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Agent notes (learning, stuck, tip, decision).
    Note,
    /// Work items tracked across iterations.
    Task,
    /// Iteration start, completion, and summaries.
    Iteration,
    /// Messages left for the agent.
    Inbox,
    /// Session-wide lifecycle.
    Session,
}

/// Error returned when parsing an unknown event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event type '{}': expected one of note, task, iteration, inbox, session",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventType {}

impl EventType {
    /// All known event types in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Note,
        Self::Task,
        Self::Iteration,
        Self::Inbox,
        Self::Session,
    ];

    /// Return the wire string for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Iteration => "iteration",
            Self::Inbox => "inbox",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(Self::Note),
            "task" => Ok(Self::Task),
            "iteration" => Ok(Self::Iteration),
            "inbox" => Ok(Self::Inbox),
            "session" => Ok(Self::Session),
            _ => Err(UnknownEventType { raw: s.to_string() }),
        }
    }
}
