use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One agent iteration within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    pub number: u32,
    pub started_at: DateTime<Utc>,
    /// Set exactly once, when the iteration completes. Never before `started_at`.
    pub ended_at: Option<DateTime<Utc>>,
    pub complete: bool,
    pub summary: String,
    pub tasks_worked: Vec<String>,
}

impl Iteration {
    #[must_use]
    pub const fn started(number: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            number,
            started_at,
            ended_at: None,
            complete: false,
            summary: String::new(),
            tasks_worked: Vec::new(),
        }
    }

    /// Wall time between start and completion, if completed.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}
