//! Per-source admission limiting.
//!
//! The limiter caps submission attempts per source address within a fixed
//! window. It runs before any durable-store access so abusive bursts are
//! shed cheaply, over in-memory state only.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::admission::{AdmissionDecision, AdmissionWindow};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sweep for expired windows once per this many admissions.
const SWEEP_INTERVAL: u64 = 512;

/// Error returned when admission configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionConfigError {
    /// Maximum attempts must be greater than zero
    ZeroMaxAttempts,
    /// Window duration must be greater than zero
    ZeroWindow,
}

impl std::fmt::Display for AdmissionConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdmissionConfigError::ZeroMaxAttempts => {
                write!(f, "max_attempts must be greater than 0")
            }
            AdmissionConfigError::ZeroWindow => {
                write!(f, "window must be greater than 0")
            }
        }
    }
}

impl std::error::Error for AdmissionConfigError {}

/// Configuration for admission limiting.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionConfig {
    /// Maximum attempts admitted per window
    pub max_attempts: u32,
    /// Length of the fixed window
    pub window: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl AdmissionConfig {
    /// Create a validated admission configuration.
    ///
    /// # Errors
    /// Returns [`AdmissionConfigError`] if either limit is zero.
    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, AdmissionConfigError> {
        if max_attempts == 0 {
            return Err(AdmissionConfigError::ZeroMaxAttempts);
        }
        if window.is_zero() {
            return Err(AdmissionConfigError::ZeroWindow);
        }
        Ok(Self {
            max_attempts,
            window,
        })
    }
}

/// Gate limiting submission attempts per source address.
///
/// Window state for a given address is mutated under the storage port's
/// per-entry lock; different addresses update independently. State lives in
/// memory only and does not survive a restart, which is acceptable for a
/// single-process deployment.
#[derive(Clone)]
pub struct AdmissionLimiter<S>
where
    S: Storage<String, AdmissionWindow>,
{
    storage: S,
    clock: Arc<dyn Clock>,
    config: AdmissionConfig,
    admissions: Arc<AtomicU64>,
    metrics: Metrics,
}

impl<S> AdmissionLimiter<S>
where
    S: Storage<String, AdmissionWindow>,
{
    /// Create a new limiter over the given window storage.
    pub fn new(storage: S, clock: Arc<dyn Clock>, config: AdmissionConfig) -> Self {
        Self::with_metrics(storage, clock, config, Metrics::new())
    }

    /// Create a new limiter sharing an existing metrics tracker.
    pub fn with_metrics(
        storage: S,
        clock: Arc<dyn Clock>,
        config: AdmissionConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            storage,
            clock,
            config,
            admissions: Arc::new(AtomicU64::new(0)),
            metrics,
        }
    }

    /// Decide whether one more attempt from this source is admitted.
    ///
    /// An absent or elapsed window is equivalent to a fresh window: the
    /// attempt is admitted with count 1. Otherwise the count is incremented
    /// and the attempt is rejected once it exceeds the configured maximum,
    /// reporting the remaining window time as `retry_after`.
    pub fn try_admit(&self, source_address: &str) -> AdmissionDecision {
        let now = self.clock.now();
        let max_attempts = self.config.max_attempts;
        let window = self.config.window;

        let decision = self.storage.with_entry_mut(
            source_address.to_string(),
            || AdmissionWindow::new(now),
            |state| state.register_attempt(now, max_attempts, window),
        );

        if let AdmissionDecision::Rejected { .. } = decision {
            self.metrics.record_rejected_rate_limit();
        }

        // Opportunistic cleanup of idle windows.
        if self.admissions.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.evict_expired();
        }

        decision
    }

    /// Drop windows that have fully elapsed.
    ///
    /// Absence of a window is equivalent to a fresh window, so eviction never
    /// changes admission decisions.
    pub fn evict_expired(&self) {
        let now = self.clock.now();
        let window = self.config.window;
        self.storage.retain(|_, state| !state.is_elapsed(now, window));
    }

    /// Number of source addresses currently tracked.
    pub fn tracked_sources(&self) -> usize {
        self.storage.len()
    }

    /// Get the limiter configuration.
    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }
}
