//! Asynchronous notification dispatch with bounded retry.
//!
//! Each accepted registration produces two independent notifications: an
//! admin alert and a welcome message. Both are delivered on detached tasks
//! with exponential backoff; failures are logged and dropped, never surfaced
//! to the registration path.

use crate::application::metrics::Metrics;
use crate::application::ports::NotificationTransport;
use crate::domain::entry::WaitlistEntry;
use crate::domain::notification::NotificationMessage;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Retry schedule for a single notification.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per message, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt `attempt` (0-based):
    /// `min(max_delay, base_delay * 2^attempt)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Snapshot of the dispatcher's transport lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherStatus {
    /// Whether a transport is currently installed
    pub configured: bool,
}

/// Handle to the detached delivery tasks of one dispatch call.
///
/// Dropping the handle detaches the tasks; they run to completion or retry
/// exhaustion regardless. `join` exists so tests can await delivery.
#[derive(Debug)]
pub struct DispatchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl DispatchHandle {
    fn detached() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Number of delivery tasks spawned by this dispatch.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for all delivery tasks to finish, including their retries.
    pub async fn join(self) {
        for task in self.tasks {
            // A panicked delivery task only loses its own notification.
            let _ = task.await;
        }
    }
}

/// Sends admin and welcome notifications for accepted registrations.
///
/// The transport is injected at construction and may be swapped at runtime
/// with [`reinitialize`](NotificationDispatcher::reinitialize); there is no
/// hidden lazy setup. An unconfigured dispatcher drops every message after
/// logging, without erroring.
pub struct NotificationDispatcher {
    transport: RwLock<Option<Arc<dyn NotificationTransport>>>,
    admin_recipient: String,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl NotificationDispatcher {
    /// Create a dispatcher with a ready-to-use transport.
    pub fn new(
        transport: Arc<dyn NotificationTransport>,
        admin_recipient: impl Into<String>,
        metrics: Metrics,
    ) -> Self {
        Self {
            transport: RwLock::new(Some(transport)),
            admin_recipient: admin_recipient.into(),
            retry: RetryPolicy::default(),
            metrics,
        }
    }

    /// Create a dispatcher with no transport installed.
    ///
    /// Every dispatch is a logged no-op until [`reinitialize`]
    /// (NotificationDispatcher::reinitialize) installs one.
    pub fn unconfigured(admin_recipient: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            transport: RwLock::new(None),
            admin_recipient: admin_recipient.into(),
            retry: RetryPolicy::default(),
            metrics,
        }
    }

    /// Override the retry schedule.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a transport is currently installed.
    pub fn is_configured(&self) -> bool {
        self.transport
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Get the current lifecycle status.
    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            configured: self.is_configured(),
        }
    }

    /// Install (or replace) the transport.
    pub fn reinitialize(&self, transport: Arc<dyn NotificationTransport>) {
        match self.transport.write() {
            Ok(mut guard) => *guard = Some(transport),
            Err(poisoned) => *poisoned.into_inner() = Some(transport),
        }
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Schedule the admin alert and welcome message for an accepted entry.
    ///
    /// Returns immediately after spawning one detached task per message; the
    /// caller never observes delivery errors. Failure of one message does not
    /// affect the other. Must be called within a tokio runtime.
    pub fn dispatch(&self, entry: &WaitlistEntry) -> DispatchHandle {
        let transport = match self.transport.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(transport) = transport else {
            tracing::debug!(
                email = %entry.email,
                "notification transport not configured, dropping notifications"
            );
            return DispatchHandle::detached();
        };

        let messages = [
            NotificationMessage::admin_alert(entry, &self.admin_recipient),
            NotificationMessage::welcome(entry),
        ];

        let tasks = messages
            .into_iter()
            .map(|message| {
                let transport = Arc::clone(&transport);
                let retry = self.retry;
                let metrics = self.metrics.clone();
                tokio::spawn(async move {
                    deliver_with_retry(transport, message, retry, metrics).await;
                })
            })
            .collect();

        DispatchHandle { tasks }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("configured", &self.is_configured())
            .field("admin_recipient", &self.admin_recipient)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Attempt delivery up to the retry budget, backing off between attempts.
///
/// Exhausted retries are recorded and logged; nothing propagates.
async fn deliver_with_retry(
    transport: Arc<dyn NotificationTransport>,
    message: NotificationMessage,
    retry: RetryPolicy,
    metrics: Metrics,
) {
    for attempt in 0..retry.max_attempts {
        match transport.send(&message).await {
            Ok(()) => {
                metrics.record_notification_sent();
                tracing::debug!(
                    template = message.template.as_str(),
                    recipient = %message.recipient,
                    attempt,
                    "notification delivered"
                );
                return;
            }
            Err(error) => {
                tracing::warn!(
                    template = message.template.as_str(),
                    recipient = %message.recipient,
                    attempt,
                    error = %error,
                    "notification send failed"
                );
                if attempt + 1 < retry.max_attempts {
                    tokio::time::sleep(retry.delay_after(attempt)).await;
                }
            }
        }
    }

    metrics.record_notification_dropped();
    tracing::error!(
        template = message.template.as_str(),
        recipient = %message.recipient,
        attempts = retry.max_attempts,
        "notification dropped after exhausting retries"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::PendingEntry;
    use crate::domain::notification::TemplateKind;
    use crate::domain::submission::NormalizedSubmission;
    use crate::infrastructure::mocks::MockTransport;
    use chrono::Utc;

    fn entry() -> WaitlistEntry {
        let submission = NormalizedSubmission {
            email: "user@domain.com".to_string(),
            twitter: "@bob".to_string(),
            telegram: String::new(),
            discord: String::new(),
            referral_code: String::new(),
        };
        PendingEntry::from_submission(submission, "203.0.113.9", "agent")
            .into_entry(1, Utc::now())
    }

    #[tokio::test]
    async fn test_dispatch_sends_both_messages() {
        let transport = Arc::new(MockTransport::new());
        let metrics = Metrics::new();
        let dispatcher =
            NotificationDispatcher::new(transport.clone(), "admin@site.com", metrics.clone());

        let handle = dispatcher.dispatch(&entry());
        assert_eq!(handle.task_count(), 2);
        handle.join().await;

        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 2);
        let templates: Vec<TemplateKind> = delivered.iter().map(|m| m.template).collect();
        assert!(templates.contains(&TemplateKind::AdminAlert));
        assert!(templates.contains(&TemplateKind::Welcome));
        assert_eq!(metrics.notifications_sent(), 2);
    }

    #[tokio::test]
    async fn test_admin_alert_goes_to_admin_recipient() {
        let transport = Arc::new(MockTransport::new());
        let dispatcher =
            NotificationDispatcher::new(transport.clone(), "admin@site.com", Metrics::new());

        dispatcher.dispatch(&entry()).join().await;

        for message in transport.delivered() {
            match message.template {
                TemplateKind::AdminAlert => assert_eq!(message.recipient, "admin@site.com"),
                TemplateKind::Welcome => assert_eq!(message.recipient, "user@domain.com"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let transport = Arc::new(MockTransport::failing_times(2));
        let metrics = Metrics::new();
        let dispatcher =
            NotificationDispatcher::new(transport.clone(), "admin@site.com", metrics.clone());

        dispatcher.dispatch(&entry()).join().await;

        // Each message fails twice and succeeds on the third attempt.
        assert_eq!(transport.attempts(), 6);
        assert_eq!(transport.delivered().len(), 2);
        assert_eq!(metrics.notifications_sent(), 2);
        assert_eq!(metrics.notifications_dropped(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_are_dropped() {
        let transport = Arc::new(MockTransport::always_failing());
        let metrics = Metrics::new();
        let dispatcher =
            NotificationDispatcher::new(transport.clone(), "admin@site.com", metrics.clone());

        dispatcher.dispatch(&entry()).join().await;

        assert_eq!(transport.attempts(), 6);
        assert!(transport.delivered().is_empty());
        assert_eq!(metrics.notifications_dropped(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_message_does_not_block_the_other() {
        let transport = Arc::new(MockTransport::failing_template(TemplateKind::AdminAlert));
        let metrics = Metrics::new();
        let dispatcher =
            NotificationDispatcher::new(transport.clone(), "admin@site.com", metrics.clone());

        dispatcher.dispatch(&entry()).join().await;

        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].template, TemplateKind::Welcome);
        assert_eq!(metrics.notifications_sent(), 1);
        assert_eq!(metrics.notifications_dropped(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_dispatch_is_a_noop() {
        let metrics = Metrics::new();
        let dispatcher = NotificationDispatcher::unconfigured("admin@site.com", metrics.clone());

        assert!(!dispatcher.is_configured());
        assert!(!dispatcher.status().configured);

        let handle = dispatcher.dispatch(&entry());
        assert_eq!(handle.task_count(), 0);
        handle.join().await;

        assert_eq!(metrics.notifications_sent(), 0);
        assert_eq!(metrics.notifications_dropped(), 0);
    }

    #[tokio::test]
    async fn test_reinitialize_installs_transport() {
        let metrics = Metrics::new();
        let dispatcher = NotificationDispatcher::unconfigured("admin@site.com", metrics);
        let transport = Arc::new(MockTransport::new());

        dispatcher.reinitialize(transport.clone());
        assert!(dispatcher.is_configured());

        dispatcher.dispatch(&entry()).join().await;
        assert_eq!(transport.delivered().len(), 2);
    }

    #[test]
    fn test_backoff_schedule() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay_after(0), Duration::from_secs(1));
        assert_eq!(retry.delay_after(1), Duration::from_secs(2));
        assert_eq!(retry.delay_after(2), Duration::from_secs(4));
        assert_eq!(retry.delay_after(3), Duration::from_secs(8));
        // Capped at max_delay from the fourth failure on.
        assert_eq!(retry.delay_after(4), Duration::from_secs(10));
        assert_eq!(retry.delay_after(30), Duration::from_secs(10));
    }
}
