//! Typed domain events.
//!
//! Each variant is one (type, action) pair of the catalog. Producers build a
//! [`DomainEvent`] and encode it with [`DomainEvent::into_event`]; the reducer
//! decodes wire records back with [`DomainEvent::decode`] and matches
//! exhaustively.
//!
//! | type/action          | id         | data       | meta                                  |
//! |----------------------|------------|------------|---------------------------------------|
//! | `note/add`           | note ID    | content    | `type`, `iteration`                   |
//! | `note/content`       | note ID    | content    | `iteration`                           |
//! | `note/type`          | note ID    | note type  | `iteration`                           |
//! | `note/delete`        | note ID    |            | `iteration`                           |
//! | `task/add`           | task ID    | title      | `description`, `priority`, `iteration`|
//! | `task/status`        | task ID    | status     | `iteration`                           |
//! | `task/priority`      | task ID    | priority   |                                       |
//! | `task/update`        | task ID    | title/""   | `description` (optional)              |
//! | `task/delete`        | task ID    |            |                                       |
//! | `iteration/start`    |            |            | `iteration`                           |
//! | `iteration/complete` |            |            | `iteration`                           |
//! | `iteration/summary`  |            | summary    | `iteration`, `tasks_worked`           |
//! | `inbox/add`          | message ID | content    |                                       |
//! | `inbox/mark_read`    | message ID |            |                                       |
//! | `session/complete`   |            |            |                                       |
//! | `session/restart`    |            |            |                                       |

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::EventType;
use super::{Event, Meta};
use crate::model::{NoteType, ParseEnumError, Priority, TaskStatus};

/// A decoded event this build knows how to fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    NoteAdded {
        id: String,
        content: String,
        note_type: NoteType,
        iteration: u32,
    },
    NoteContentChanged {
        id: String,
        content: String,
        iteration: u32,
    },
    NoteTypeChanged {
        id: String,
        note_type: NoteType,
        iteration: u32,
    },
    NoteDeleted {
        id: String,
        iteration: u32,
    },
    TaskAdded {
        id: String,
        title: String,
        description: String,
        priority: Priority,
        iteration: u32,
    },
    TaskStatusChanged {
        id: String,
        status: TaskStatus,
        iteration: u32,
    },
    TaskPriorityChanged {
        id: String,
        priority: Priority,
    },
    TaskUpdated {
        id: String,
        title: Option<String>,
        description: Option<String>,
    },
    TaskDeleted {
        id: String,
    },
    IterationStarted {
        number: u32,
    },
    IterationCompleted {
        number: u32,
    },
    IterationSummarized {
        number: u32,
        summary: String,
        tasks_worked: Vec<String>,
    },
    MessageAdded {
        id: String,
        content: String,
    },
    MessageRead {
        id: String,
    },
    SessionCompleted,
    SessionRestarted,
}

/// Why a wire record could not be interpreted.
///
/// The reducer treats every variant as "skip this event".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown event type '{0}'")]
    UnknownType(String),

    #[error("unknown action '{action}' for event type '{event_type}'")]
    UnknownAction {
        event_type: EventType,
        action: String,
    },

    #[error("bad payload for {event_type}/{action}: field '{field}' {reason}")]
    Payload {
        event_type: EventType,
        action: String,
        field: &'static str,
        reason: String,
    },
}

impl DomainEvent {
    /// The coarse category this variant is written under.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::NoteAdded { .. }
            | Self::NoteContentChanged { .. }
            | Self::NoteTypeChanged { .. }
            | Self::NoteDeleted { .. } => EventType::Note,
            Self::TaskAdded { .. }
            | Self::TaskStatusChanged { .. }
            | Self::TaskPriorityChanged { .. }
            | Self::TaskUpdated { .. }
            | Self::TaskDeleted { .. } => EventType::Task,
            Self::IterationStarted { .. }
            | Self::IterationCompleted { .. }
            | Self::IterationSummarized { .. } => EventType::Iteration,
            Self::MessageAdded { .. } | Self::MessageRead { .. } => EventType::Inbox,
            Self::SessionCompleted | Self::SessionRestarted => EventType::Session,
        }
    }

    /// The wire action verb for this variant.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::NoteAdded { .. } | Self::TaskAdded { .. } | Self::MessageAdded { .. } => "add",
            Self::NoteContentChanged { .. } => "content",
            Self::NoteTypeChanged { .. } => "type",
            Self::NoteDeleted { .. } | Self::TaskDeleted { .. } => "delete",
            Self::TaskStatusChanged { .. } => "status",
            Self::TaskPriorityChanged { .. } => "priority",
            Self::TaskUpdated { .. } => "update",
            Self::IterationStarted { .. } => "start",
            Self::IterationCompleted { .. } | Self::SessionCompleted => "complete",
            Self::IterationSummarized { .. } => "summary",
            Self::MessageRead { .. } => "mark_read",
            Self::SessionRestarted => "restart",
        }
    }

    /// Encode into a wire record for `session`, stamped with `timestamp`.
    #[must_use]
    pub fn into_event(self, session: &str, timestamp: DateTime<Utc>) -> Event {
        let event_type = self.event_type().as_str().to_string();
        let action = self.action().to_string();

        let (id, data, meta) = match self {
            Self::NoteAdded {
                id,
                content,
                note_type,
                iteration,
            } => (
                id,
                content,
                meta([
                    ("type", note_type.as_str().into()),
                    ("iteration", iteration.into()),
                ]),
            ),
            Self::NoteContentChanged {
                id,
                content,
                iteration,
            } => (id, content, meta([("iteration", iteration.into())])),
            Self::NoteTypeChanged {
                id,
                note_type,
                iteration,
            } => (
                id,
                note_type.as_str().to_string(),
                meta([("iteration", iteration.into())]),
            ),
            Self::NoteDeleted { id, iteration } => {
                (id, String::new(), meta([("iteration", iteration.into())]))
            }
            Self::TaskAdded {
                id,
                title,
                description,
                priority,
                iteration,
            } => (
                id,
                title,
                meta([
                    ("description", description.into()),
                    ("priority", priority.as_str().into()),
                    ("iteration", iteration.into()),
                ]),
            ),
            Self::TaskStatusChanged {
                id,
                status,
                iteration,
            } => (
                id,
                status.as_str().to_string(),
                meta([("iteration", iteration.into())]),
            ),
            Self::TaskPriorityChanged { id, priority } => {
                (id, priority.as_str().to_string(), Meta::new())
            }
            Self::TaskUpdated {
                id,
                title,
                description,
            } => {
                let mut fields = Meta::new();
                if let Some(description) = description {
                    fields.insert("description".into(), description.into());
                }
                (id, title.unwrap_or_default(), fields)
            }
            Self::TaskDeleted { id } => (id, String::new(), Meta::new()),
            Self::IterationStarted { number } | Self::IterationCompleted { number } => (
                String::new(),
                String::new(),
                meta([("iteration", number.into())]),
            ),
            Self::IterationSummarized {
                number,
                summary,
                tasks_worked,
            } => (
                String::new(),
                summary,
                meta([
                    ("iteration", number.into()),
                    ("tasks_worked", tasks_worked.into()),
                ]),
            ),
            Self::MessageAdded { id, content } => (id, content, Meta::new()),
            Self::MessageRead { id } => (id, String::new(), Meta::new()),
            Self::SessionCompleted | Self::SessionRestarted => {
                (String::new(), String::new(), Meta::new())
            }
        };

        Event {
            id,
            timestamp,
            session: session.to_string(),
            event_type,
            action,
            data,
            meta,
        }
    }

    /// Interpret a wire record.
    ///
    /// Meta keys this build does not know are ignored, so producers may add
    /// fields freely.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownType`] / [`DecodeError::UnknownAction`]
    /// for pairs outside the catalog and [`DecodeError::Payload`] when a
    /// required field is missing or malformed.
    pub fn decode(event: &Event) -> Result<Self, DecodeError> {
        let event_type: EventType = event
            .event_type
            .parse()
            .map_err(|_| DecodeError::UnknownType(event.event_type.clone()))?;
        let p = Payload { event, event_type };

        let decoded = match (event_type, event.action.as_str()) {
            (EventType::Note, "add") => Self::NoteAdded {
                id: p.id()?,
                content: event.data.clone(),
                note_type: p.meta_enum("type")?,
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Note, "content") => Self::NoteContentChanged {
                id: p.id()?,
                content: event.data.clone(),
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Note, "type") => Self::NoteTypeChanged {
                id: p.id()?,
                note_type: p.data_enum()?,
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Note, "delete") => Self::NoteDeleted {
                id: p.id()?,
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Task, "add") => Self::TaskAdded {
                id: p.id()?,
                title: event.data.clone(),
                description: p.meta_str("description")?.unwrap_or_default(),
                priority: p.meta_enum_or_default("priority")?,
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Task, "status") => Self::TaskStatusChanged {
                id: p.id()?,
                status: p.data_enum()?,
                iteration: p.iteration_or_zero()?,
            },
            (EventType::Task, "priority") => Self::TaskPriorityChanged {
                id: p.id()?,
                priority: p.data_enum()?,
            },
            (EventType::Task, "update") => Self::TaskUpdated {
                id: p.id()?,
                title: Some(event.data.clone()).filter(|t| !t.is_empty()),
                description: p.meta_str("description")?,
            },
            (EventType::Task, "delete") => Self::TaskDeleted { id: p.id()? },
            (EventType::Iteration, "start") => Self::IterationStarted {
                number: p.iteration()?,
            },
            (EventType::Iteration, "complete") => Self::IterationCompleted {
                number: p.iteration()?,
            },
            (EventType::Iteration, "summary") => Self::IterationSummarized {
                number: p.iteration()?,
                summary: event.data.clone(),
                tasks_worked: p.meta_str_list("tasks_worked")?,
            },
            (EventType::Inbox, "add") => Self::MessageAdded {
                id: p.id()?,
                content: event.data.clone(),
            },
            (EventType::Inbox, "mark_read") => Self::MessageRead { id: p.id()? },
            (EventType::Session, "complete") => Self::SessionCompleted,
            (EventType::Session, "restart") => Self::SessionRestarted,
            (event_type, action) => {
                return Err(DecodeError::UnknownAction {
                    event_type,
                    action: action.to_string(),
                });
            }
        };

        Ok(decoded)
    }
}

fn meta<const N: usize>(pairs: [(&str, Value); N]) -> Meta {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Field accessors for one record, producing [`DecodeError::Payload`] on
/// failure.
struct Payload<'a> {
    event: &'a Event,
    event_type: EventType,
}

impl Payload<'_> {
    fn error(&self, field: &'static str, reason: impl Into<String>) -> DecodeError {
        DecodeError::Payload {
            event_type: self.event_type,
            action: self.event.action.clone(),
            field,
            reason: reason.into(),
        }
    }

    fn id(&self) -> Result<String, DecodeError> {
        if self.event.id.is_empty() {
            Err(self.error("id", "is missing"))
        } else {
            Ok(self.event.id.clone())
        }
    }

    fn iteration(&self) -> Result<u32, DecodeError> {
        self.meta_u32("iteration")?
            .ok_or_else(|| self.error("iteration", "is missing"))
    }

    fn iteration_or_zero(&self) -> Result<u32, DecodeError> {
        Ok(self.meta_u32("iteration")?.unwrap_or(0))
    }

    fn meta_u32(&self, field: &'static str) -> Result<Option<u32>, DecodeError> {
        match self.event.meta.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| self.error(field, format!("is not a u32: {value}"))),
        }
    }

    fn meta_str(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.event.meta.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(value) => Err(self.error(field, format!("is not a string: {value}"))),
        }
    }

    fn meta_str_list(&self, field: &'static str) -> Result<Vec<String>, DecodeError> {
        match self.event.meta.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.error(field, format!("has a non-string entry: {item}")))
                })
                .collect(),
            Some(value) => Err(self.error(field, format!("is not an array: {value}"))),
        }
    }

    fn meta_enum<T>(&self, field: &'static str) -> Result<T, DecodeError>
    where
        T: FromStr<Err = ParseEnumError>,
    {
        let raw = self
            .meta_str(field)?
            .ok_or_else(|| self.error(field, "is missing"))?;
        raw.parse().map_err(|e: ParseEnumError| self.error(field, e.to_string()))
    }

    fn meta_enum_or_default<T>(&self, field: &'static str) -> Result<T, DecodeError>
    where
        T: FromStr<Err = ParseEnumError> + Default,
    {
        match self.meta_str(field)? {
            None => Ok(T::default()),
            Some(raw) => raw.parse().map_err(|e: ParseEnumError| self.error(field, e.to_string())),
        }
    }

    fn data_enum<T>(&self) -> Result<T, DecodeError>
    where
        T: FromStr<Err = ParseEnumError>,
    {
        self.event
            .data
            .parse()
            .map_err(|e: ParseEnumError| self.error("data", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn raw(event_type: &str, action: &str, id: &str, data: &str, meta: Value) -> Event {
        Event {
            id: id.into(),
            timestamp: ts(),
            session: "demo".into(),
            event_type: event_type.into(),
            action: action.into(),
            data: data.into(),
            meta: meta.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn note_add_encodes_catalog_shape() {
        let event = DomainEvent::NoteAdded {
            id: "NOT-1".into(),
            content: "Learned about caching".into(),
            note_type: NoteType::Learning,
            iteration: 3,
        }
        .into_event("demo", ts());

        assert_eq!(event.event_type, "note");
        assert_eq!(event.action, "add");
        assert_eq!(event.id, "NOT-1");
        assert_eq!(event.data, "Learned about caching");
        assert_eq!(
            Value::Object(event.meta),
            json!({"type": "learning", "iteration": 3})
        );
    }

    #[test]
    fn every_variant_survives_the_wire() {
        let variants = vec![
            DomainEvent::NoteAdded {
                id: "NOT-1".into(),
                content: "c".into(),
                note_type: NoteType::Tip,
                iteration: 1,
            },
            DomainEvent::NoteContentChanged {
                id: "NOT-1".into(),
                content: "c2".into(),
                iteration: 2,
            },
            DomainEvent::NoteTypeChanged {
                id: "NOT-1".into(),
                note_type: NoteType::Stuck,
                iteration: 2,
            },
            DomainEvent::NoteDeleted {
                id: "NOT-1".into(),
                iteration: 4,
            },
            DomainEvent::TaskAdded {
                id: "TSK-1".into(),
                title: "Write parser".into(),
                description: "tokenizer first".into(),
                priority: Priority::High,
                iteration: 1,
            },
            DomainEvent::TaskStatusChanged {
                id: "TSK-1".into(),
                status: TaskStatus::InProgress,
                iteration: 1,
            },
            DomainEvent::TaskPriorityChanged {
                id: "TSK-1".into(),
                priority: Priority::Low,
            },
            DomainEvent::TaskUpdated {
                id: "TSK-1".into(),
                title: None,
                description: Some("rewrite".into()),
            },
            DomainEvent::TaskDeleted { id: "TSK-1".into() },
            DomainEvent::IterationStarted { number: 7 },
            DomainEvent::IterationCompleted { number: 7 },
            DomainEvent::IterationSummarized {
                number: 7,
                summary: "done".into(),
                tasks_worked: vec!["TSK-1".into(), "TSK-2".into()],
            },
            DomainEvent::MessageAdded {
                id: "0123456789abcdef".into(),
                content: "hi".into(),
            },
            DomainEvent::MessageRead {
                id: "0123456789abcdef".into(),
            },
            DomainEvent::SessionCompleted,
            DomainEvent::SessionRestarted,
        ];

        for variant in variants {
            let event = variant.clone().into_event("demo", ts());
            let json = serde_json::to_string(&event).unwrap();
            let back: Event = serde_json::from_str(&json).unwrap();
            assert_eq!(back.decode().unwrap(), variant, "{json}");
        }
    }

    #[test]
    fn unknown_action_is_reported() {
        let err = raw("note", "pin", "NOT-1", "", json!({})).decode().unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownAction {
                event_type: EventType::Note,
                action: "pin".into()
            }
        );
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = raw("agent", "spawn", "", "", json!({})).decode().unwrap_err();
        assert_eq!(err, DecodeError::UnknownType("agent".into()));
    }

    #[test]
    fn bad_note_type_is_payload_error() {
        let err = raw("note", "add", "NOT-1", "x", json!({"type": "insight"}))
            .decode()
            .unwrap_err();
        assert!(matches!(err, DecodeError::Payload { field: "type", .. }));
    }

    #[test]
    fn iteration_events_require_a_number() {
        let err = raw("iteration", "start", "", "", json!({})).decode().unwrap_err();
        assert!(matches!(err, DecodeError::Payload { field: "iteration", .. }));

        let err = raw("iteration", "start", "", "", json!({"iteration": -1}))
            .decode()
            .unwrap_err();
        assert!(matches!(err, DecodeError::Payload { field: "iteration", .. }));
    }

    #[test]
    fn extra_meta_fields_are_ignored() {
        let decoded = raw(
            "note",
            "add",
            "NOT-2",
            "x",
            json!({"type": "tip", "iteration": 2, "model": "future-field"}),
        )
        .decode()
        .unwrap();
        assert_eq!(
            decoded,
            DomainEvent::NoteAdded {
                id: "NOT-2".into(),
                content: "x".into(),
                note_type: NoteType::Tip,
                iteration: 2,
            }
        );
    }

    #[test]
    fn task_add_without_priority_defaults_to_medium() {
        let decoded = raw("task", "add", "TSK-3", "t", json!({})).decode().unwrap();
        assert!(matches!(
            decoded,
            DomainEvent::TaskAdded {
                priority: Priority::Medium,
                ..
            }
        ));
    }

    #[test]
    fn missing_id_is_payload_error() {
        let err = raw("inbox", "mark_read", "", "", json!({})).decode().unwrap_err();
        assert!(matches!(err, DecodeError::Payload { field: "id", .. }));
    }
}
