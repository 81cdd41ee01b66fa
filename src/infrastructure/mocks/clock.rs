//! Mock clock for testing.

use crate::application::ports::Clock;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling
/// deterministic testing of admission windows and join timestamps. Monotonic
/// and wall-clock time advance together.
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned to share across threads.
/// All clones share the same underlying time value, so advancing time in
/// one clone affects all clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<MockClockInner>>,
}

#[derive(Debug, Clone, Copy)]
struct MockClockInner {
    instant: Instant,
    wall: DateTime<Utc>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    ///
    /// Wall-clock time starts at the current UTC time.
    pub fn new(start: Instant) -> Self {
        Self::with_wall(start, Utc::now())
    }

    /// Create a mock clock with explicit monotonic and wall-clock starts.
    pub fn with_wall(start: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClockInner {
                instant: start,
                wall,
            })),
        }
    }

    /// Advance both clocks by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut inner = self
            .inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        inner.instant += duration;
        inner.wall += ChronoDuration::from_std(duration)
            .expect("advance duration out of range for chrono");
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .instant
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .wall
    }
}
