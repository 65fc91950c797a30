//! Materialized entities folded out of a session log.

pub mod inbox;
pub mod iteration;
pub mod note;
pub mod task;

use std::fmt;

pub use inbox::Message;
pub use iteration::Iteration;
pub use note::{Note, NoteType};
pub use task::{InvalidTransition, Priority, Task, TaskStatus};

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}': expected one of {}",
            self.expected,
            self.got,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
