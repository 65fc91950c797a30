//! orbit-core library.
//!
//! An append-only, per-session event log plus a deterministic reducer that
//! rebuilds session state (tasks, notes, iterations, inbox) by replaying the
//! log from the beginning.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in the library; `anyhow::Result` only at
//!   the configuration boundary.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod lock;
pub mod log;
pub mod model;
pub mod state;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorCategory, ErrorCode, StoreError};
pub use event::{DomainEvent, Event, EventType};
pub use log::{Deadline, EventLog, FileLog, LogError, MemoryLog};
pub use state::State;
pub use store::{SessionSummary, Store, list_sessions, reset_session};
