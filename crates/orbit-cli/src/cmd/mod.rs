pub mod completions;
pub mod inbox;
pub mod iteration;
pub mod note;
pub mod session;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use orbit_core::config::StoreSettings;
use orbit_core::error::StoreError;
use orbit_core::log::{EventLog, FileLog};
use orbit_core::store::Store;

use crate::output::OutputMode;

/// Everything a command handler needs: the opened log, the target session,
/// and how to render.
pub struct Context {
    log: Arc<FileLog>,
    pub session: String,
    pub output: OutputMode,
    pub list_timeout: Duration,
}

impl Context {
    pub fn new(settings: &StoreSettings, session: String, output: OutputMode) -> Self {
        let log = FileLog::new(&settings.data_dir)
            .with_durable(settings.durable)
            .with_lock_timeout(settings.lock_timeout);
        Self {
            log: Arc::new(log),
            session,
            output,
            list_timeout: settings.list_timeout,
        }
    }

    /// A store bound to the selected session.
    pub fn store(&self) -> Result<Store, StoreError> {
        Store::with_system_clock(self.log.clone(), self.session.clone())
    }

    pub fn log(&self) -> &dyn EventLog {
        self.log.as_ref()
    }
}
