//! Registration orchestration.
//!
//! The coordinator owns the end-to-end submission path: normalize the raw
//! fields, gate the source address, insert atomically into the registry, and
//! schedule notifications without awaiting them. Every submission ends in
//! exactly one [`RegistrationOutcome`].

use crate::application::dispatcher::NotificationDispatcher;
use crate::application::limiter::AdmissionLimiter;
use crate::application::metrics::Metrics;
use crate::application::ports::{InsertOutcome, Registry, RegistryError, Storage};
use crate::domain::admission::{AdmissionDecision, AdmissionWindow};
use crate::domain::entry::{EntrySummary, PendingEntry, Position, WaitlistEntry};
use crate::domain::submission::{normalize, SubmissionRequest, ValidationError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// How many entries the stats query returns.
const RECENT_LIMIT: usize = 10;

/// Terminal outcome of one submission.
///
/// Duplicates are not failures: the existing position is returned so the
/// caller observes idempotent identity semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// A new entry was created with a freshly assigned position
    Registered(WaitlistEntry),
    /// The email is already on the waitlist
    AlreadyRegistered {
        /// Position of the existing entry
        position: Position,
    },
    /// The submission failed validation before any durable write
    RejectedValidation(ValidationError),
    /// The source address exceeded its admission budget
    RejectedRateLimit {
        /// Time until the source's window elapses
        retry_after: Duration,
    },
    /// The registry failed; no partial state was committed
    RejectedInternal,
}

impl RegistrationOutcome {
    /// Machine-readable outcome kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationOutcome::Registered(_) => "registered",
            RegistrationOutcome::AlreadyRegistered { .. } => "already_registered",
            RegistrationOutcome::RejectedValidation(_) => "rejected_validation",
            RegistrationOutcome::RejectedRateLimit { .. } => "rejected_rate_limit",
            RegistrationOutcome::RejectedInternal => "rejected_internal",
        }
    }

    /// Human-readable message for the outbound boundary.
    pub fn message(&self) -> String {
        match self {
            RegistrationOutcome::Registered(entry) => {
                format!("Successfully joined waitlist at position {}", entry.position)
            }
            RegistrationOutcome::AlreadyRegistered { .. } => {
                "This email address is already on the waitlist".to_string()
            }
            RegistrationOutcome::RejectedValidation(error) => error.to_string(),
            RegistrationOutcome::RejectedRateLimit { .. } => {
                "Too many submissions from this address, please try again later".to_string()
            }
            RegistrationOutcome::RejectedInternal => {
                "Failed to join waitlist, please try again".to_string()
            }
        }
    }

    /// Retry-after duration for rate-limit rejections.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RegistrationOutcome::RejectedRateLimit { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether the submission produced or matched a waitlist entry.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            RegistrationOutcome::Registered(_) | RegistrationOutcome::AlreadyRegistered { .. }
        )
    }
}

/// Aggregate view of the waitlist: total size and the most recent entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistStats {
    /// Total number of accepted entries.
    pub total: u64,
    /// Up to ten most recent entries, newest first.
    pub recent_submissions: Vec<EntrySummary>,
}

/// Drives each submission through normalize, admit, insert, and dispatch.
pub struct RegistrationCoordinator<S>
where
    S: Storage<String, AdmissionWindow>,
{
    registry: Arc<dyn Registry>,
    limiter: AdmissionLimiter<S>,
    dispatcher: Arc<NotificationDispatcher>,
    metrics: Metrics,
}

impl<S> RegistrationCoordinator<S>
where
    S: Storage<String, AdmissionWindow>,
{
    /// Create a new coordinator.
    ///
    /// Pass the same [`Metrics`] handed to the limiter and dispatcher to get
    /// one unified snapshot.
    pub fn new(
        registry: Arc<dyn Registry>,
        limiter: AdmissionLimiter<S>,
        dispatcher: Arc<NotificationDispatcher>,
        metrics: Metrics,
    ) -> Self {
        Self {
            registry,
            limiter,
            dispatcher,
            metrics,
        }
    }

    /// Process one submission end to end.
    ///
    /// Validation and rate-limit rejections are decided before any registry
    /// access. Notification dispatch is fire-and-forget: the outcome is
    /// returned before any send attempt resolves, and notification failures
    /// never influence it.
    pub async fn register(&self, request: SubmissionRequest) -> RegistrationOutcome {
        let submission = match normalize(&request) {
            Ok(submission) => submission,
            Err(error) => {
                self.metrics.record_rejected_validation();
                tracing::debug!(source = %request.source_address, %error, "submission rejected");
                return RegistrationOutcome::RejectedValidation(error);
            }
        };

        if let AdmissionDecision::Rejected { retry_after } =
            self.limiter.try_admit(&request.source_address)
        {
            tracing::warn!(
                source = %request.source_address,
                retry_after_secs = retry_after.as_secs(),
                "submission rate limited"
            );
            return RegistrationOutcome::RejectedRateLimit { retry_after };
        }

        let pending =
            PendingEntry::from_submission(submission, request.source_address, request.client_agent);

        match self.registry.insert_if_absent(pending).await {
            Ok(InsertOutcome::Created(entry)) => {
                self.metrics.record_registered();
                tracing::info!(
                    email = %entry.email,
                    position = entry.position,
                    "waitlist entry created"
                );
                // Fire and forget; the handle is dropped and the tasks run on.
                let _ = self.dispatcher.dispatch(&entry);
                RegistrationOutcome::Registered(entry)
            }
            Ok(InsertOutcome::AlreadyExists { position }) => {
                self.metrics.record_duplicate();
                tracing::debug!(position, "duplicate submission");
                RegistrationOutcome::AlreadyRegistered { position }
            }
            Err(error) => {
                self.metrics.record_rejected_internal();
                tracing::error!(%error, "registry insert failed");
                RegistrationOutcome::RejectedInternal
            }
        }
    }

    /// Total count plus the ten most recent entries, as external summaries.
    pub async fn stats(&self) -> Result<WaitlistStats, RegistryError> {
        let total = self.registry.count_all().await?;
        let recent = self.registry.list_recent(RECENT_LIMIT).await?;
        Ok(WaitlistStats {
            total,
            recent_submissions: recent.iter().map(EntrySummary::from).collect(),
        })
    }

    /// Look up a single entry by email, as an external summary.
    ///
    /// The email is trimmed and lowercased before lookup, matching the
    /// identity normalization applied at registration.
    pub async fn position_of(&self, email: &str) -> Result<Option<EntrySummary>, RegistryError> {
        let email = email.trim().to_lowercase();
        let entry = self.registry.lookup_by_email(&email).await?;
        Ok(entry.as_ref().map(EntrySummary::from))
    }

    /// Get the shared metrics tracker.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get the notification dispatcher.
    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }
}
