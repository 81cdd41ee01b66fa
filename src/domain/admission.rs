//! Admission window accounting.
//!
//! Pure window math for per-source submission limiting. The application
//! layer owns concurrency and storage; this module only decides whether an
//! attempt at a given instant fits inside the window.

use std::time::{Duration, Instant};

/// Decision for a single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The attempt is within the window's budget
    Admitted,
    /// The attempt exceeded the budget; retry after the window elapses
    Rejected {
        /// Time remaining until the current window ends
        retry_after: Duration,
    },
}

impl AdmissionDecision {
    /// Whether the attempt was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted)
    }
}

/// Attempt counter for one source address within a fixed window.
///
/// An elapsed window is equivalent to no window at all: the next attempt
/// starts a fresh window with count 1.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionWindow {
    started_at: Instant,
    attempts: u32,
}

impl AdmissionWindow {
    /// Open a fresh window with no attempts recorded.
    pub fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            attempts: 0,
        }
    }

    /// Register one attempt and decide whether to admit it.
    ///
    /// If the window has elapsed, it restarts at `now` before counting.
    /// Attempts up to and including `max_attempts` are admitted; beyond that
    /// the remaining window time is reported as `retry_after`.
    pub fn register_attempt(
        &mut self,
        now: Instant,
        max_attempts: u32,
        window: Duration,
    ) -> AdmissionDecision {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= window {
            self.started_at = now;
            self.attempts = 0;
        }

        self.attempts += 1;
        if self.attempts <= max_attempts {
            AdmissionDecision::Admitted
        } else {
            let elapsed = now.saturating_duration_since(self.started_at);
            AdmissionDecision::Rejected {
                retry_after: window - elapsed,
            }
        }
    }

    /// Whether the window has fully elapsed at `now`.
    pub fn is_elapsed(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.started_at) >= window
    }

    /// Attempts recorded in the current window.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);
    const MAX: u32 = 5;

    #[test]
    fn test_admits_up_to_max() {
        let now = Instant::now();
        let mut window = AdmissionWindow::new(now);

        for _ in 0..MAX {
            assert!(window.register_attempt(now, MAX, WINDOW).is_admitted());
        }
        assert_eq!(window.attempts(), MAX);
    }

    #[test]
    fn test_rejects_beyond_max_with_positive_retry_after() {
        let now = Instant::now();
        let mut window = AdmissionWindow::new(now);

        for _ in 0..MAX {
            window.register_attempt(now, MAX, WINDOW);
        }

        let later = now + Duration::from_secs(60);
        match window.register_attempt(later, MAX, WINDOW) {
            AdmissionDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(840));
            }
            AdmissionDecision::Admitted => panic!("sixth attempt should be rejected"),
        }
    }

    #[test]
    fn test_elapsed_window_restarts() {
        let now = Instant::now();
        let mut window = AdmissionWindow::new(now);

        for _ in 0..MAX + 2 {
            window.register_attempt(now, MAX, WINDOW);
        }

        // First attempt after the window elapses opens a fresh window.
        let after = now + WINDOW;
        assert!(window.register_attempt(after, MAX, WINDOW).is_admitted());
        assert_eq!(window.attempts(), 1);
    }

    #[test]
    fn test_is_elapsed() {
        let now = Instant::now();
        let window = AdmissionWindow::new(now);

        assert!(!window.is_elapsed(now + Duration::from_secs(899), WINDOW));
        assert!(window.is_elapsed(now + WINDOW, WINDOW));
    }

    #[test]
    fn test_rejection_repeats_until_window_ends() {
        let now = Instant::now();
        let mut window = AdmissionWindow::new(now);

        for _ in 0..MAX {
            window.register_attempt(now, MAX, WINDOW);
        }
        assert!(!window.register_attempt(now, MAX, WINDOW).is_admitted());
        assert!(!window
            .register_attempt(now + Duration::from_secs(500), MAX, WINDOW)
            .is_admitted());
    }
}
