use chrono::{DateTime, Duration, TimeZone, Utc};
use orbit_core::event::{DomainEvent, Event, Meta};
use orbit_core::model::{NoteType, Priority, TaskStatus};
use proptest::prelude::*;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> + Clone {
    (0i64..1_000_000).prop_map(|secs| base_time() + Duration::seconds(secs))
}

pub fn arb_note_id() -> impl Strategy<Value = String> + Clone {
    (1u64..6).prop_map(|n| format!("NOT-{n}"))
}

pub fn arb_task_id() -> impl Strategy<Value = String> + Clone {
    (1u64..6).prop_map(|n| format!("TSK-{n}"))
}

pub fn arb_message_id() -> impl Strategy<Value = String> + Clone {
    prop::sample::select(vec!["abcdef123456", "abcdef789012", "0123456789abcdef"])
        .prop_map(String::from)
}

fn arb_text() -> impl Strategy<Value = String> + Clone {
    "[a-z ]{1,12}"
}

fn arb_note_event() -> impl Strategy<Value = DomainEvent> {
    prop_oneof![
        (
            arb_note_id(),
            arb_text(),
            prop::sample::select(NoteType::ALL.to_vec()),
            0u32..4
        )
            .prop_map(|(id, content, note_type, iteration)| DomainEvent::NoteAdded {
                id,
                content,
                note_type,
                iteration,
            }),
        (arb_note_id(), arb_text(), 0u32..4).prop_map(|(id, content, iteration)| {
            DomainEvent::NoteContentChanged {
                id,
                content,
                iteration,
            }
        }),
        (
            arb_note_id(),
            prop::sample::select(NoteType::ALL.to_vec()),
            0u32..4
        )
            .prop_map(|(id, note_type, iteration)| DomainEvent::NoteTypeChanged {
                id,
                note_type,
                iteration,
            }),
        (arb_note_id(), 0u32..4).prop_map(|(id, iteration)| DomainEvent::NoteDeleted { id, iteration }),
    ]
}

fn arb_task_event() -> impl Strategy<Value = DomainEvent> {
    prop_oneof![
        (
            arb_task_id(),
            arb_text(),
            arb_text(),
            prop::sample::select(Priority::ALL.to_vec()),
            0u32..4
        )
            .prop_map(|(id, title, description, priority, iteration)| {
                DomainEvent::TaskAdded {
                    id,
                    title,
                    description,
                    priority,
                    iteration,
                }
            }),
        (
            arb_task_id(),
            prop::sample::select(TaskStatus::ALL.to_vec()),
            0u32..4
        )
            .prop_map(|(id, status, iteration)| DomainEvent::TaskStatusChanged {
                id,
                status,
                iteration,
            }),
        (arb_task_id(), prop::sample::select(Priority::ALL.to_vec()))
            .prop_map(|(id, priority)| DomainEvent::TaskPriorityChanged { id, priority }),
        (
            arb_task_id(),
            prop::option::of(arb_text()),
            prop::option::of(arb_text())
        )
            .prop_map(|(id, title, description)| DomainEvent::TaskUpdated {
                id,
                title,
                description,
            }),
        arb_task_id().prop_map(|id| DomainEvent::TaskDeleted { id }),
    ]
}

fn arb_other_event() -> impl Strategy<Value = DomainEvent> {
    prop_oneof![
        (1u32..4).prop_map(|number| DomainEvent::IterationStarted { number }),
        (1u32..4).prop_map(|number| DomainEvent::IterationCompleted { number }),
        (
            1u32..4,
            arb_text(),
            prop::collection::vec(arb_task_id(), 0..3)
        )
            .prop_map(|(number, summary, tasks_worked)| {
                DomainEvent::IterationSummarized {
                    number,
                    summary,
                    tasks_worked,
                }
            }),
        (arb_message_id(), arb_text())
            .prop_map(|(id, content)| DomainEvent::MessageAdded { id, content }),
        arb_message_id().prop_map(|id| DomainEvent::MessageRead { id }),
        Just(DomainEvent::SessionCompleted),
        Just(DomainEvent::SessionRestarted),
    ]
}

pub fn arb_domain_event() -> impl Strategy<Value = DomainEvent> {
    prop_oneof![arb_note_event(), arb_task_event(), arb_other_event()]
}

pub fn arb_known_event() -> impl Strategy<Value = Event> {
    (arb_domain_event(), arb_timestamp())
        .prop_map(|(domain, timestamp)| domain.into_event("prop", timestamp))
}

/// Records a build of this crate does not understand: new types, new actions
/// on known types, and known pairs with payloads that fail to decode.
pub fn arb_unknown_event() -> impl Strategy<Value = Event> {
    let pairs = prop::sample::select(vec![
        ("agent", "spawn"),
        ("hologram", "beam"),
        ("note", "pin"),
        ("task", "archive"),
        ("session", "pause"),
        ("iteration", "start"),
    ]);
    (pairs, arb_timestamp(), arb_text()).prop_map(|((event_type, action), timestamp, data)| {
        let mut meta = Meta::new();
        meta.insert("future".into(), serde_json::json!({"nested": [1, 2, 3]}));
        Event {
            id: String::new(),
            timestamp,
            session: "prop".into(),
            event_type: event_type.into(),
            action: action.into(),
            data,
            meta,
        }
    })
}

pub fn arb_log() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(arb_known_event(), 0..60)
}
