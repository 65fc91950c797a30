use tracing::info;

use super::{Store, require_text};
use crate::error::StoreError;
use crate::event::DomainEvent;
use crate::id::{NOTE_PREFIX, sequential_id};
use crate::model::{Note, NoteType};
use crate::state::State;

/// Exact lowercase spelling only. The lenient `FromStr` is for reading logs.
fn parse_note_type(raw: &str) -> Result<NoteType, StoreError> {
    require_text("type", raw)?;
    NoteType::ALL
        .into_iter()
        .find(|t| t.as_str() == raw)
        .ok_or_else(|| {
            let allowed: Vec<&str> = NoteType::ALL.iter().map(|t| t.as_str()).collect();
            StoreError::validation(
                "type",
                format!("'{raw}' is not a note type; expected one of {}", allowed.join(", ")),
            )
        })
}

fn require_note(state: &State, id: &str) -> Result<(), StoreError> {
    require_text("id", id)?;
    if state.note(id).is_some() {
        Ok(())
    } else {
        Err(StoreError::not_found("note", id))
    }
}

impl Store {
    /// Record a new note with the next `NOT-<n>` ID.
    ///
    /// # Errors
    ///
    /// Validation error on empty content or an unknown type; log errors
    /// verbatim.
    pub fn note_add(&self, content: &str, note_type: &str, iteration: u32) -> Result<Note, StoreError> {
        require_text("content", content)?;
        let note_type = parse_note_type(note_type)?;

        let state = self.load_state()?;
        let id = sequential_id(NOTE_PREFIX, state.note_counter);

        let event = self.append(DomainEvent::NoteAdded {
            id: id.clone(),
            content: content.to_string(),
            note_type,
            iteration,
        })?;

        info!(session = %self.session, %id, %note_type, "note added");
        Ok(Note {
            id,
            content: content.to_string(),
            note_type,
            created_at: event.timestamp,
            updated_at: event.timestamp,
            iteration,
        })
    }

    /// Notes in creation order, optionally only those of one type.
    ///
    /// # Errors
    ///
    /// Validation error if the filter is not a note type.
    pub fn note_list(&self, type_filter: Option<&str>) -> Result<Vec<Note>, StoreError> {
        let filter = type_filter.map(parse_note_type).transpose()?;
        let state = self.load_state()?;
        Ok(state
            .notes
            .into_iter()
            .filter(|note| filter.is_none_or(|t| note.note_type == t))
            .collect())
    }

    /// Replace a note's content.
    ///
    /// # Errors
    ///
    /// Validation error on empty arguments; not-found if the note is absent.
    pub fn note_content(&self, id: &str, content: &str, iteration: u32) -> Result<(), StoreError> {
        require_text("id", id)?;
        require_text("content", content)?;
        require_note(&self.load_state()?, id)?;

        self.append(DomainEvent::NoteContentChanged {
            id: id.to_string(),
            content: content.to_string(),
            iteration,
        })?;
        Ok(())
    }

    /// Change a note's type.
    ///
    /// # Errors
    ///
    /// Validation error on an empty ID or unknown type; not-found if the note
    /// is absent.
    pub fn note_type(&self, id: &str, note_type: &str, iteration: u32) -> Result<(), StoreError> {
        require_text("id", id)?;
        let note_type = parse_note_type(note_type)?;
        require_note(&self.load_state()?, id)?;

        self.append(DomainEvent::NoteTypeChanged {
            id: id.to_string(),
            note_type,
            iteration,
        })?;
        Ok(())
    }

    /// Remove a note.
    ///
    /// # Errors
    ///
    /// Validation error on an empty ID; not-found if the note is absent.
    pub fn note_delete(&self, id: &str, iteration: u32) -> Result<(), StoreError> {
        require_note(&self.load_state()?, id)?;

        self.append(DomainEvent::NoteDeleted {
            id: id.to_string(),
            iteration,
        })?;
        info!(session = %self.session, %id, "note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::store;
    use crate::error::{ErrorCategory, StoreError};
    use crate::model::NoteType;

    #[test]
    fn ids_count_up_without_gaps() {
        let (_log, store) = store();
        let ids: Vec<String> = (0..3)
            .map(|i| store.note_add(&format!("note {i}"), "tip", 1).unwrap().id)
            .collect();
        assert_eq!(ids, vec!["NOT-1", "NOT-2", "NOT-3"]);
    }

    #[test]
    fn returned_note_matches_replayed_note() {
        let (_log, store) = store();
        let note = store.note_add("Learned about caching", "learning", 3).unwrap();
        assert_eq!(note.created_at, note.updated_at);

        let state = store.load_state().unwrap();
        assert_eq!(state.notes, vec![note]);
    }

    #[test]
    fn type_filter_selects_matching_notes() {
        let (_log, store) = store();
        store.note_add("Learned about caching", "learning", 1).unwrap();
        store.note_add("Stuck on auth", "stuck", 1).unwrap();

        let learning = store.note_list(Some("learning")).unwrap();
        assert_eq!(learning.len(), 1);
        assert_eq!(learning[0].content, "Learned about caching");
        assert_eq!(store.note_list(None).unwrap().len(), 2);
    }

    #[test]
    fn invalid_filter_is_validation_error() {
        let (_log, store) = store();
        let err = store.note_list(Some("insight")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn add_validates_before_appending() {
        let (log, store) = store();
        for (content, note_type) in [("", "tip"), ("   ", "tip"), ("x", ""), ("x", "insight")] {
            let err = store.note_add(content, note_type, 1).unwrap_err();
            assert!(matches!(err, StoreError::Validation { .. }), "{content:?}/{note_type:?}");
        }
        assert_eq!(log.len("demo"), 0);
    }

    #[test]
    fn retype_rejects_unknown_or_empty_type() {
        let (log, store) = store();
        let note = store.note_add("draft", "tip", 1).unwrap();
        for bad in ["insight", "", "  "] {
            let err = store.note_type(&note.id, bad, 1).unwrap_err();
            assert!(matches!(err, StoreError::Validation { field: "type", .. }), "{bad:?}");
        }
        assert_eq!(log.len("demo"), 1);
        assert_eq!(store.load_state().unwrap().notes[0].note_type, NoteType::Tip);
    }

    #[test]
    fn types_must_use_canonical_spelling() {
        let (log, store) = store();
        assert!(matches!(
            store.note_add("x", "LEARNING", 1),
            Err(StoreError::Validation { .. })
        ));
        assert!(matches!(
            store.note_add("y", "  tip ", 1),
            Err(StoreError::Validation { .. })
        ));
        assert!(matches!(
            store.note_list(Some("STUCK")),
            Err(StoreError::Validation { .. })
        ));
        assert_eq!(log.len("demo"), 0);
    }

    #[test]
    fn missing_note_is_not_found_and_appends_nothing() {
        let (log, store) = store();
        let err = store.note_content("NOT-999", "x", 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "note", .. }));
        assert!(matches!(
            store.note_type("NOT-999", "tip", 1),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.note_delete("NOT-999", 1),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(log.len("demo"), 0);
    }

    #[test]
    fn content_and_type_updates_bump_updated_at() {
        let (_log, store) = store();
        let note = store.note_add("draft", "tip", 1).unwrap();
        store.note_content(&note.id, "final", 2).unwrap();
        store.note_type(&note.id, "decision", 2).unwrap();

        let state = store.load_state().unwrap();
        let updated = state.note(&note.id).unwrap();
        assert_eq!(updated.content, "final");
        assert_eq!(updated.note_type, NoteType::Decision);
        assert_eq!(updated.iteration, 2);
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn delete_removes_but_does_not_reuse_ids() {
        let (_log, store) = store();
        let first = store.note_add("one", "tip", 1).unwrap();
        store.note_delete(&first.id, 1).unwrap();
        assert!(store.note_list(None).unwrap().is_empty());

        let second = store.note_add("two", "tip", 1).unwrap();
        assert_eq!(second.id, "NOT-2");
    }
}
