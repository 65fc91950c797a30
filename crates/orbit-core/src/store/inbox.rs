use super::{Store, require_text};
use crate::error::StoreError;
use crate::event::DomainEvent;
use crate::id::{random_id, resolve_prefix};
use crate::model::Message;

impl Store {
    /// Post a message under a fresh random ID. Needs no replay.
    ///
    /// # Errors
    ///
    /// Validation error on empty content; log errors verbatim.
    pub fn inbox_add(&self, content: &str) -> Result<Message, StoreError> {
        require_text("content", content)?;
        let id = random_id();

        let event = self.append(DomainEvent::MessageAdded {
            id: id.clone(),
            content: content.to_string(),
        })?;

        Ok(Message {
            id,
            content: content.to_string(),
            read: false,
            created_at: event.timestamp,
        })
    }

    /// Mark the message matching `id_or_prefix` as read and return its full
    /// ID.
    ///
    /// # Errors
    ///
    /// Validation error for candidates shorter than eight characters;
    /// not-found or ambiguous per [`resolve_prefix`].
    pub fn inbox_mark_read(&self, id_or_prefix: &str) -> Result<String, StoreError> {
        let state = self.load_state()?;
        let id = resolve_prefix(
            "message",
            id_or_prefix,
            state.inbox.iter().map(|message| message.id.as_str()),
        )?;

        self.append(DomainEvent::MessageRead { id: id.clone() })?;
        Ok(id)
    }

    /// Unread messages in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the log cannot be read.
    pub fn inbox_list(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.load_state()?.unread().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::store;
    use crate::error::{ErrorCategory, StoreError};
    use crate::event::DomainEvent;
    use crate::log::EventLog;
    use chrono::Utc;

    fn seed(log: &dyn EventLog, id: &str) {
        let event = DomainEvent::MessageAdded {
            id: id.into(),
            content: format!("message {id}"),
        }
        .into_event("demo", Utc::now());
        log.append("demo", &event).unwrap();
    }

    #[test]
    fn add_then_list_unread() {
        let (_log, store) = store();
        let message = store.inbox_add("please review").unwrap();
        assert_eq!(message.id.len(), 16);
        assert_eq!(store.inbox_list().unwrap(), vec![message]);
    }

    #[test]
    fn empty_content_is_rejected() {
        let (_log, store) = store();
        assert!(matches!(
            store.inbox_add(""),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn mark_read_resolves_unique_prefix() {
        let (log, store) = store();
        seed(log.as_ref(), "abcdef123456");
        seed(log.as_ref(), "abcdef789012");

        assert_eq!(store.inbox_mark_read("abcdef12").unwrap(), "abcdef123456");
        let unread = store.inbox_list().unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, "abcdef789012");
    }

    #[test]
    fn mark_read_boundaries_append_nothing() {
        let (log, store) = store();
        seed(log.as_ref(), "abcdef12aaaa");
        seed(log.as_ref(), "abcdef12bbbb");
        let before = log.len("demo");

        let short = store.inbox_mark_read("abcdef1").unwrap_err();
        assert_eq!(short.category(), ErrorCategory::Validation);
        let ambiguous = store.inbox_mark_read("abcdef12").unwrap_err();
        assert_eq!(ambiguous.category(), ErrorCategory::Ambiguous);
        let missing = store.inbox_mark_read("12345678").unwrap_err();
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        assert_eq!(log.len("demo"), before);
    }
}
