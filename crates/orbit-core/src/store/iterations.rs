use tracing::info;

use super::{Store, require_iteration_number};
use crate::error::StoreError;
use crate::event::DomainEvent;
use crate::model::Iteration;
use crate::state::State;

fn existing_iteration(state: &State, number: u32) -> Result<&Iteration, StoreError> {
    state
        .iteration(number)
        .ok_or_else(|| StoreError::not_found("iteration", number.to_string()))
}

impl Store {
    /// Open iteration `number`.
    ///
    /// # Errors
    ///
    /// Validation error for 0 or an already-started number.
    pub fn iteration_start(&self, number: u32) -> Result<(), StoreError> {
        require_iteration_number(number)?;
        if self.load_state()?.iteration(number).is_some() {
            return Err(StoreError::validation(
                "iteration",
                format!("iteration {number} has already started"),
            ));
        }

        self.append(DomainEvent::IterationStarted { number })?;
        info!(session = %self.session, number, "iteration started");
        Ok(())
    }

    /// Close iteration `number`.
    ///
    /// # Errors
    ///
    /// Not-found if it never started; validation error if already complete.
    pub fn iteration_complete(&self, number: u32) -> Result<(), StoreError> {
        require_iteration_number(number)?;
        let state = self.load_state()?;
        if existing_iteration(&state, number)?.complete {
            return Err(StoreError::validation(
                "iteration",
                format!("iteration {number} is already complete"),
            ));
        }

        self.append(DomainEvent::IterationCompleted { number })?;
        info!(session = %self.session, number, "iteration completed");
        Ok(())
    }

    /// Attach a summary and the IDs of the tasks worked to iteration
    /// `number`, replacing any earlier summary.
    ///
    /// # Errors
    ///
    /// Not-found if the iteration never started.
    pub fn iteration_summary(
        &self,
        number: u32,
        summary: &str,
        tasks_worked: Vec<String>,
    ) -> Result<(), StoreError> {
        require_iteration_number(number)?;
        existing_iteration(&self.load_state()?, number)?;

        self.append(DomainEvent::IterationSummarized {
            number,
            summary: summary.to_string(),
            tasks_worked,
        })?;
        Ok(())
    }

    /// All iterations in start order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Log`] if the log cannot be read.
    pub fn iteration_list(&self) -> Result<Vec<Iteration>, StoreError> {
        Ok(self.load_state()?.iterations)
    }
}
