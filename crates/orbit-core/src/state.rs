//! Session state reducer.
//!
//! [`State`] is never persisted. It is rebuilt on every read by folding the
//! session log from the first event with [`State::apply`]. The fold is pure
//! and deterministic: the same events in the same order always produce the
//! same state.
//!
//! Records this build cannot interpret (unknown type/action, or a payload
//! that does not decode) are skipped and counted, never fatal, so older
//! builds can replay logs written by newer ones.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::event::{DomainEvent, Event};
use crate::id::{NOTE_PREFIX, TASK_PREFIX, parse_sequence};
use crate::model::{Iteration, Message, Note, Task, TaskStatus};

/// The materialized view of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct State {
    /// Notes in creation order.
    pub notes: Vec<Note>,
    /// Tasks keyed by ID.
    pub tasks: BTreeMap<String, Task>,
    /// Iterations in start order.
    pub iterations: Vec<Iteration>,
    /// Inbox messages in arrival order.
    pub inbox: Vec<Message>,
    /// Highest `NOT-<n>` sequence observed.
    pub note_counter: u64,
    /// Highest `TSK-<n>` sequence observed.
    pub task_counter: u64,
    /// Whether the session has been marked complete.
    pub complete: bool,
    /// Timestamp of the most recent event, applied or skipped.
    pub last_activity: Option<DateTime<Utc>>,
    /// Events folded into this state.
    pub events_applied: u64,
    /// Events skipped because this build could not interpret them.
    pub events_skipped: u64,
}

impl State {
    /// An empty state, as before the first event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an ordered event sequence from empty state.
    #[must_use]
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut state = Self::new();
        for event in events {
            state.apply(event);
        }
        state
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &Event) {
        self.last_activity = Some(
            self.last_activity
                .map_or(event.timestamp, |last| last.max(event.timestamp)),
        );

        match event.decode() {
            Ok(domain) => {
                self.apply_domain(&domain, event.timestamp);
                self.events_applied += 1;
            }
            Err(err) => {
                debug!(
                    event_type = %event.event_type,
                    action = %event.action,
                    error = %err,
                    "skipping event"
                );
                self.events_skipped += 1;
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn apply_domain(&mut self, event: &DomainEvent, at: DateTime<Utc>) {
        match event {
            DomainEvent::NoteAdded {
                id,
                content,
                note_type,
                iteration,
            } => {
                if let Some(n) = parse_sequence(NOTE_PREFIX, id) {
                    self.note_counter = self.note_counter.max(n);
                }
                let note = Note {
                    id: id.clone(),
                    content: content.clone(),
                    note_type: *note_type,
                    created_at: at,
                    updated_at: at,
                    iteration: *iteration,
                };
                // Two writers racing on the same counter produce the same ID;
                // the later event wins.
                match self.note_mut(id) {
                    Some(existing) => *existing = note,
                    None => self.notes.push(note),
                }
            }
            DomainEvent::NoteContentChanged {
                id,
                content,
                iteration,
            } => {
                if let Some(note) = self.note_mut(id) {
                    note.content.clone_from(content);
                    note.updated_at = at;
                    note.iteration = *iteration;
                }
            }
            DomainEvent::NoteTypeChanged {
                id,
                note_type,
                iteration,
            } => {
                if let Some(note) = self.note_mut(id) {
                    note.note_type = *note_type;
                    note.updated_at = at;
                    note.iteration = *iteration;
                }
            }
            DomainEvent::NoteDeleted { id, .. } => {
                self.notes.retain(|note| note.id != *id);
            }
            DomainEvent::TaskAdded {
                id,
                title,
                description,
                priority,
                iteration,
            } => {
                if let Some(n) = parse_sequence(TASK_PREFIX, id) {
                    self.task_counter = self.task_counter.max(n);
                }
                self.tasks.insert(
                    id.clone(),
                    Task {
                        id: id.clone(),
                        title: title.clone(),
                        description: description.clone(),
                        status: TaskStatus::Open,
                        priority: *priority,
                        created_at: at,
                        updated_at: at,
                        iteration: *iteration,
                    },
                );
            }
            DomainEvent::TaskStatusChanged {
                id,
                status,
                iteration,
            } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.status = *status;
                    task.updated_at = at;
                    task.iteration = *iteration;
                }
            }
            DomainEvent::TaskPriorityChanged { id, priority } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.priority = *priority;
                    task.updated_at = at;
                }
            }
            DomainEvent::TaskUpdated {
                id,
                title,
                description,
            } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    if let Some(title) = title {
                        task.title.clone_from(title);
                    }
                    if let Some(description) = description {
                        task.description.clone_from(description);
                    }
                    task.updated_at = at;
                }
            }
            DomainEvent::TaskDeleted { id } => {
                self.tasks.remove(id);
            }
            DomainEvent::IterationStarted { number } => {
                if self.iteration(*number).is_none() {
                    self.iterations.push(Iteration::started(*number, at));
                }
            }
            DomainEvent::IterationCompleted { number } => {
                if let Some(iteration) = self.iteration_mut(*number) {
                    if !iteration.complete {
                        iteration.complete = true;
                        iteration.ended_at = Some(at.max(iteration.started_at));
                    }
                }
            }
            DomainEvent::IterationSummarized {
                number,
                summary,
                tasks_worked,
            } => {
                if let Some(iteration) = self.iteration_mut(*number) {
                    iteration.summary.clone_from(summary);
                    iteration.tasks_worked.clone_from(tasks_worked);
                }
            }
            DomainEvent::MessageAdded { id, content } => {
                let message = Message {
                    id: id.clone(),
                    content: content.clone(),
                    read: false,
                    created_at: at,
                };
                match self.inbox.iter_mut().find(|m| m.id == *id) {
                    Some(existing) => *existing = message,
                    None => self.inbox.push(message),
                }
            }
            DomainEvent::MessageRead { id } => {
                if let Some(message) = self.inbox.iter_mut().find(|m| m.id == *id) {
                    message.read = true;
                }
            }
            DomainEvent::SessionCompleted => self.complete = true,
            DomainEvent::SessionRestarted => self.complete = false,
        }
    }

    /// Look up a note by exact ID.
    #[must_use]
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    /// Look up an iteration by number.
    #[must_use]
    pub fn iteration(&self, number: u32) -> Option<&Iteration> {
        self.iterations.iter().find(|it| it.number == number)
    }

    fn iteration_mut(&mut self, number: u32) -> Option<&mut Iteration> {
        self.iterations.iter_mut().find(|it| it.number == number)
    }

    /// Messages not yet marked read, in arrival order.
    pub fn unread(&self) -> impl Iterator<Item = &Message> {
        self.inbox.iter().filter(|m| !m.read)
    }

    /// `(completed, total)` task counts.
    #[must_use]
    pub fn task_progress(&self) -> (usize, usize) {
        let completed = self
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        (completed, self.tasks.len())
    }
}
