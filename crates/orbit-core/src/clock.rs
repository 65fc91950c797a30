//! Time sources for event timestamps.
//!
//! Event timestamps are producer-assigned. [`SystemClock`] hands out strictly
//! increasing microsecond timestamps within a process
//! (`next = max(system_time_us, last + 1)`), so two events produced back to
//! back never share an instant. [`ManualClock`] is a deterministic clock for
//! tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// A source of event timestamps.
pub trait Clock: Send + Sync {
    /// Return the timestamp for the next event.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock with a per-instance monotonic floor.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_us: AtomicI64,
}

impl SystemClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_us: AtomicI64::new(0),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = system_time_us();
        let mut last = self.last_us.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_us.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return from_micros(next),
                Err(observed) => last = observed,
            }
        }
    }
}

/// Deterministic clock: every call returns the current instant and then
/// advances it by a fixed step.
#[derive(Debug)]
pub struct ManualClock {
    current_us: AtomicI64,
    step_us: i64,
}

impl ManualClock {
    /// Start at `start`, advancing one second per call.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self::with_step(start, Duration::from_secs(1))
    }

    /// Start at `start`, advancing by `step` per call.
    #[must_use]
    pub fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current_us: AtomicI64::new(start.timestamp_micros()),
            step_us: i64::try_from(step.as_micros()).unwrap_or(i64::MAX),
        }
    }

    /// Peek at the instant the next call to [`Clock::now`] will return.
    #[must_use]
    pub fn peek(&self) -> DateTime<Utc> {
        from_micros(self.current_us.load(Ordering::Acquire))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        from_micros(self.current_us.fetch_add(self.step_us, Ordering::AcqRel))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn system_time_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

fn from_micros(us: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(us).unwrap_or_default()
}
