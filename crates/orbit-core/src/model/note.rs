use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, normalize};

/// The four categories an agent can file a note under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Learning,
    Stuck,
    Tip,
    Decision,
}

impl NoteType {
    pub const ALL: [Self; 4] = [Self::Learning, Self::Stuck, Self::Tip, Self::Decision];

    const NAMES: &'static [&'static str] = &["learning", "stuck", "tip", "decision"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Stuck => "stuck",
            Self::Tip => "tip",
            Self::Decision => "decision",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "learning" => Ok(Self::Learning),
            "stuck" => Ok(Self::Stuck),
            "tip" => Ok(Self::Tip),
            "decision" => Ok(Self::Decision),
            _ => Err(ParseEnumError {
                expected: "note type",
                got: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// A note left by an agent during the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Iteration during which the note was last touched.
    pub iteration: u32,
}
