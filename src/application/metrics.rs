//! Observability metrics for the registration pipeline.
//!
//! Provides counters for every submission outcome and for notification
//! delivery, for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking registration statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same underlying counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Submissions accepted with a new position
    registered: AtomicU64,
    /// Submissions matching an existing email
    duplicates: AtomicU64,
    /// Submissions rejected by the normalizer
    rejected_validation: AtomicU64,
    /// Submissions rejected by the admission limiter
    rejected_rate_limit: AtomicU64,
    /// Submissions aborted by storage failure
    rejected_internal: AtomicU64,
    /// Notifications delivered (possibly after retries)
    notifications_sent: AtomicU64,
    /// Notifications dropped after exhausting retries
    notifications_dropped: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                registered: AtomicU64::new(0),
                duplicates: AtomicU64::new(0),
                rejected_validation: AtomicU64::new(0),
                rejected_rate_limit: AtomicU64::new(0),
                rejected_internal: AtomicU64::new(0),
                notifications_sent: AtomicU64::new(0),
                notifications_dropped: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_registered(&self) {
        self.inner.registered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.inner.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_validation(&self) {
        self.inner.rejected_validation.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_rate_limit(&self) {
        self.inner.rejected_rate_limit.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_internal(&self) {
        self.inner.rejected_internal.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_notification_sent(&self) {
        self.inner.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_notification_dropped(&self) {
        self.inner
            .notifications_dropped
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of accepted registrations.
    pub fn registered(&self) -> u64 {
        self.inner.registered.load(Ordering::Relaxed)
    }

    /// Get the total number of duplicate submissions.
    pub fn duplicates(&self) -> u64 {
        self.inner.duplicates.load(Ordering::Relaxed)
    }

    /// Get the total number of validation rejections.
    pub fn rejected_validation(&self) -> u64 {
        self.inner.rejected_validation.load(Ordering::Relaxed)
    }

    /// Get the total number of rate-limit rejections.
    pub fn rejected_rate_limit(&self) -> u64 {
        self.inner.rejected_rate_limit.load(Ordering::Relaxed)
    }

    /// Get the total number of storage-failure rejections.
    pub fn rejected_internal(&self) -> u64 {
        self.inner.rejected_internal.load(Ordering::Relaxed)
    }

    /// Get the total number of notifications delivered.
    pub fn notifications_sent(&self) -> u64 {
        self.inner.notifications_sent.load(Ordering::Relaxed)
    }

    /// Get the total number of notifications dropped after retries.
    pub fn notifications_dropped(&self) -> u64 {
        self.inner.notifications_dropped.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registered: self.registered(),
            duplicates: self.duplicates(),
            rejected_validation: self.rejected_validation(),
            rejected_rate_limit: self.rejected_rate_limit(),
            rejected_internal: self.rejected_internal(),
            notifications_sent: self.notifications_sent(),
            notifications_dropped: self.notifications_dropped(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.registered.store(0, Ordering::Relaxed);
        self.inner.duplicates.store(0, Ordering::Relaxed);
        self.inner.rejected_validation.store(0, Ordering::Relaxed);
        self.inner.rejected_rate_limit.store(0, Ordering::Relaxed);
        self.inner.rejected_internal.store(0, Ordering::Relaxed);
        self.inner.notifications_sent.store(0, Ordering::Relaxed);
        self.inner.notifications_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Submissions accepted with a new position
    pub registered: u64,
    /// Submissions matching an existing email
    pub duplicates: u64,
    /// Submissions rejected by the normalizer
    pub rejected_validation: u64,
    /// Submissions rejected by the admission limiter
    pub rejected_rate_limit: u64,
    /// Submissions aborted by storage failure
    pub rejected_internal: u64,
    /// Notifications delivered
    pub notifications_sent: u64,
    /// Notifications dropped after exhausting retries
    pub notifications_dropped: u64,
}

impl MetricsSnapshot {
    /// Total submissions processed, across all outcomes.
    pub fn total_submissions(&self) -> u64 {
        self.registered
            .saturating_add(self.duplicates)
            .saturating_add(self.rejected_validation)
            .saturating_add(self.rejected_rate_limit)
            .saturating_add(self.rejected_internal)
    }

    /// Ratio of accepted registrations to total submissions (0.0 to 1.0).
    ///
    /// Returns 0.0 if no submissions have been processed.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.total_submissions();
        if total == 0 {
            0.0
        } else {
            self.registered as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let metrics = Metrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_submissions(), 0);
        assert_eq!(snapshot.acceptance_rate(), 0.0);
    }

    #[test]
    fn test_counters_record_independently() {
        let metrics = Metrics::new();
        metrics.record_registered();
        metrics.record_registered();
        metrics.record_duplicate();
        metrics.record_rejected_validation();
        metrics.record_rejected_rate_limit();
        metrics.record_rejected_internal();
        metrics.record_notification_sent();
        metrics.record_notification_dropped();

        assert_eq!(metrics.registered(), 2);
        assert_eq!(metrics.duplicates(), 1);
        assert_eq!(metrics.rejected_validation(), 1);
        assert_eq!(metrics.rejected_rate_limit(), 1);
        assert_eq!(metrics.rejected_internal(), 1);
        assert_eq!(metrics.notifications_sent(), 1);
        assert_eq!(metrics.notifications_dropped(), 1);
    }

    #[test]
    fn test_snapshot_totals() {
        let metrics = Metrics::new();
        metrics.record_registered();
        metrics.record_registered();
        metrics.record_registered();
        metrics.record_duplicate();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_submissions(), 4);
        assert!((snapshot.acceptance_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_notifications_not_counted_as_submissions() {
        let metrics = Metrics::new();
        metrics.record_notification_sent();
        metrics.record_notification_dropped();
        assert_eq!(metrics.snapshot().total_submissions(), 0);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_registered();
        metrics.record_notification_dropped();

        metrics.reset();
        assert_eq!(metrics.registered(), 0);
        assert_eq!(metrics.notifications_dropped(), 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics1 = Metrics::new();
        metrics1.record_registered();

        let metrics2 = metrics1.clone();
        metrics2.record_registered();

        assert_eq!(metrics1.registered(), 2);
        assert_eq!(metrics2.registered(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_registered();
                    m.record_duplicate();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.registered(), 1000);
        assert_eq!(metrics.duplicates(), 1000);
    }
}
