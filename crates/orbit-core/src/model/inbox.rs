use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message dropped into the session inbox for the agent to pick up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
