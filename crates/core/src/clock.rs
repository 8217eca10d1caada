//! Clock abstraction for testable time handling

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time.
///
/// `event_timestamp` is used for event §3 `timestamp` fields: it must be
/// strictly increasing across successive calls on the same clock so that
/// nanosecond-resolution tie-breaking (§5) is meaningful even when two
/// events are appended within the same millisecond.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;

    /// An RFC3339 timestamp with nanosecond resolution, monotonically
    /// increasing across calls on this clock instance.
    fn event_timestamp(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock {
    nanos_seq: Arc<AtomicU64>,
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn event_timestamp(&self) -> DateTime<Utc> {
        let ms = self.epoch_ms();
        let sub_ms_nanos = self.nanos_seq.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        epoch_ms_to_timestamp(ms, sub_ms_nanos as u32)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    epoch_ms: Arc<Mutex<u64>>,
    nanos_seq: Arc<AtomicU64>,
}

fn epoch_ms_to_timestamp(ms: u64, sub_ms_nanos: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(
        (ms / 1000) as i64,
        ((ms % 1000) as u32) * 1_000_000 + sub_ms_nanos,
    )
    .unwrap_or_else(Utc::now)
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            epoch_ms: Arc::new(Mutex::new(1_000_000)),
            nanos_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
        *self.epoch_ms.lock() += duration.as_millis() as u64;
    }

    /// Set the clock to a specific instant
    pub fn set(&self, instant: Instant) {
        *self.current.lock() = instant;
    }

    /// Set the epoch milliseconds value
    pub fn set_epoch_ms(&self, ms: u64) {
        *self.epoch_ms.lock() = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }

    fn event_timestamp(&self) -> DateTime<Utc> {
        let ms = self.epoch_ms();
        let sub_ms_nanos = self.nanos_seq.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        epoch_ms_to_timestamp(ms, sub_ms_nanos as u32)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
