use tracing::info;

use super::{Store, require_text};
use crate::error::StoreError;
use crate::event::DomainEvent;
use crate::id::{TASK_PREFIX, parse_sequence, sequential_id};
use crate::model::{Priority, Task, TaskStatus};
use crate::state::State;

fn existing_task(state: &State, id: &str) -> Result<Task, StoreError> {
    require_text("id", id)?;
    state
        .tasks
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::not_found("task", id))
}

impl Store {
    /// Record a new open task with the next `TSK-<n>` ID.
    ///
    /// # Errors
    ///
    /// Validation error on an empty title; log errors verbatim.
    pub fn task_add(
        &self,
        title: &str,
        description: &str,
        priority: Priority,
        iteration: u32,
    ) -> Result<Task, StoreError> {
        require_text("title", title)?;

        let state = self.load_state()?;
        let id = sequential_id(TASK_PREFIX, state.task_counter);

        let event = self.append(DomainEvent::TaskAdded {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            priority,
            iteration,
        })?;

        info!(session = %self.session, %id, %priority, "task added");
        Ok(Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Open,
            priority,
            created_at: event.timestamp,
            updated_at: event.timestamp,
            iteration,
        })
    }

    /// Move a task to `status`, following the lifecycle rules of
    /// [`TaskStatus::can_transition_to`].
    ///
    /// # Errors
    ///
    /// Not-found if the task is absent; [`StoreError::InvalidTransition`] for
    /// disallowed moves.
    pub fn task_status(&self, id: &str, status: TaskStatus, iteration: u32) -> Result<Task, StoreError> {
        let mut task = existing_task(&self.load_state()?, id)?;
        task.status
            .can_transition_to(status)
            .map_err(|err| StoreError::InvalidTransition {
                id: id.to_string(),
                from: err.from.to_string(),
                to: err.to.to_string(),
                reason: err.reason,
            })?;

        let event = self.append(DomainEvent::TaskStatusChanged {
            id: id.to_string(),
            status,
            iteration,
        })?;

        info!(session = %self.session, %id, from = %task.status, to = %status, "task status changed");
        task.status = status;
        task.iteration = iteration;
        task.updated_at = event.timestamp;
        Ok(task)
    }

    /// # Errors
    ///
    /// Not-found if the task is absent.
    pub fn task_priority(&self, id: &str, priority: Priority) -> Result<Task, StoreError> {
        let mut task = existing_task(&self.load_state()?, id)?;

        let event = self.append(DomainEvent::TaskPriorityChanged {
            id: id.to_string(),
            priority,
        })?;

        task.priority = priority;
        task.updated_at = event.timestamp;
        Ok(task)
    }

    /// Change a task's title and/or description.
    ///
    /// # Errors
    ///
    /// Validation error when neither field is given or the title is empty;
    /// not-found if the task is absent.
    pub fn task_update(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task, StoreError> {
        if title.is_none() && description.is_none() {
            return Err(StoreError::validation(
                "update",
                "provide a title, a description, or both",
            ));
        }
        if let Some(title) = title {
            require_text("title", title)?;
        }
        let mut task = existing_task(&self.load_state()?, id)?;

        let event = self.append(DomainEvent::TaskUpdated {
            id: id.to_string(),
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        })?;

        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(description) = description {
            task.description = description.to_string();
        }
        task.updated_at = event.timestamp;
        Ok(task)
    }

    /// # Errors
    ///
    /// Not-found if the task is absent.
    pub fn task_delete(&self, id: &str) -> Result<(), StoreError> {
        existing_task(&self.load_state()?, id)?;
        self.append(DomainEvent::TaskDeleted { id: id.to_string() })?;
        info!(session = %self.session, %id, "task deleted");
        Ok(())
    }

    /// Tasks ordered by priority (critical first), then by ID sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the log cannot be read.
    pub fn task_list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, StoreError> {
        let state = self.load_state()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .into_values()
            .filter(|task| status.is_none_or(|s| task.status == s))
            .collect();
        tasks.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| sequence_key(&a.id).cmp(&sequence_key(&b.id)))
        });
        Ok(tasks)
    }

    /// # Errors
    ///
    /// Not-found if the task is absent.
    pub fn task_get(&self, id: &str) -> Result<Task, StoreError> {
        existing_task(&self.load_state()?, id)
    }
}

/// Sort key placing well-formed `TSK-<n>` IDs numerically ahead of others.
fn sequence_key(id: &str) -> (u64, &str) {
    (parse_sequence(TASK_PREFIX, id).unwrap_or(u64::MAX), id)
}

#[cfg(test)]
mod tests {
    use super::super::tests::store;
    use crate::error::{ErrorCode, StoreError};
    use crate::model::{Priority, TaskStatus};

    #[test]
    fn add_allocates_sequential_ids() {
        let (_log, store) = store();
        let a = store.task_add("Write parser", "", Priority::High, 1).unwrap();
        let b = store.task_add("Write lexer", "", Priority::Low, 1).unwrap();
        assert_eq!((a.id.as_str(), b.id.as_str()), ("TSK-1", "TSK-2"));
        assert_eq!(a.status, TaskStatus::Open);
        assert_eq!(store.task_get("TSK-1").unwrap(), a);
    }

    #[test]
    fn empty_title_is_rejected() {
        let (log, store) = store();
        let err = store.task_add("  ", "", Priority::Medium, 1).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));
        assert_eq!(log.len("demo"), 0);
    }

    #[test]
    fn allowed_transition_is_recorded() {
        let (_log, store) = store();
        store.task_add("t", "", Priority::Medium, 1).unwrap();
        let task = store.task_status("TSK-1", TaskStatus::InProgress, 2).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(store.task_get("TSK-1").unwrap(), task);
    }

    #[test]
    fn disallowed_transition_appends_nothing() {
        let (log, store) = store();
        store.task_add("t", "", Priority::Medium, 1).unwrap();
        store.task_status("TSK-1", TaskStatus::Completed, 1).unwrap();

        let before = log.len("demo");
        let err = store.task_status("TSK-1", TaskStatus::Blocked, 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);

        let err = store.task_status("TSK-1", TaskStatus::Completed, 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(log.len("demo"), before);
    }

    #[test]
    fn list_orders_by_priority_then_sequence() {
        let (_log, store) = store();
        for (title, priority) in [
            ("a", Priority::Low),
            ("b", Priority::Critical),
            ("c", Priority::Low),
            ("d", Priority::High),
        ] {
            store.task_add(title, "", priority, 1).unwrap();
        }
        for n in 5..=11 {
            store.task_add(&format!("t{n}"), "", Priority::Critical, 1).unwrap();
        }

        let ids: Vec<String> = store.task_list(None).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "TSK-2", "TSK-5", "TSK-6", "TSK-7", "TSK-8", "TSK-9", "TSK-10", "TSK-11", "TSK-4",
                "TSK-1", "TSK-3"
            ]
        );
    }

    #[test]
    fn list_filters_by_status() {
        let (_log, store) = store();
        store.task_add("a", "", Priority::Medium, 1).unwrap();
        store.task_add("b", "", Priority::Medium, 1).unwrap();
        store.task_status("TSK-2", TaskStatus::Blocked, 1).unwrap();

        let blocked = store.task_list(Some(TaskStatus::Blocked)).unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].id, "TSK-2");
    }

    #[test]
    fn update_requires_a_field() {
        let (_log, store) = store();
        store.task_add("a", "", Priority::Medium, 1).unwrap();
        assert!(matches!(
            store.task_update("TSK-1", None, None),
            Err(StoreError::Validation { .. })
        ));
        assert!(matches!(
            store.task_update("TSK-1", Some(""), None),
            Err(StoreError::Validation { .. })
        ));

        let task = store.task_update("TSK-1", None, Some("details")).unwrap();
        assert_eq!(task.title, "a");
        assert_eq!(task.description, "details");
        assert_eq!(store.task_get("TSK-1").unwrap(), task);
    }

    #[test]
    fn priority_and_delete() {
        let (_log, store) = store();
        store.task_add("a", "", Priority::Medium, 1).unwrap();
        let task = store.task_priority("TSK-1", Priority::Critical).unwrap();
        assert_eq!(store.task_get("TSK-1").unwrap(), task);

        store.task_delete("TSK-1").unwrap();
        assert!(matches!(
            store.task_get("TSK-1"),
            Err(StoreError::NotFound { kind: "task", .. })
        ));
        assert!(matches!(
            store.task_delete("TSK-1"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
