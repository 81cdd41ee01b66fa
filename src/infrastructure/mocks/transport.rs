//! Mock notification transport for testing.

use crate::application::ports::{NotificationTransport, TransportError};
use crate::domain::notification::{NotificationMessage, TemplateKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Failure behavior scripted into a [`MockTransport`].
#[derive(Debug, Clone, Copy)]
enum FailureMode {
    /// Every attempt succeeds
    None,
    /// The first `n` attempts per message fail, then attempts succeed
    FirstAttempts(u32),
    /// Every attempt fails
    Always,
    /// Every attempt for one template fails; the other succeeds
    Template(TemplateKind),
}

/// Recording transport with scriptable failures.
///
/// Tracks every attempt and every successful delivery so tests can assert
/// on retry counts and delivered payloads.
#[derive(Debug)]
pub struct MockTransport {
    mode: FailureMode,
    attempts: AtomicU64,
    attempts_per_message: Mutex<Vec<(String, u32)>>,
    delivered: Mutex<Vec<NotificationMessage>>,
}

impl MockTransport {
    /// Transport on which every send succeeds.
    pub fn new() -> Self {
        Self::with_mode(FailureMode::None)
    }

    /// Transport failing the first `attempts` sends of each message, then
    /// succeeding.
    pub fn failing_times(attempts: u32) -> Self {
        Self::with_mode(FailureMode::FirstAttempts(attempts))
    }

    /// Transport on which every send fails.
    pub fn always_failing() -> Self {
        Self::with_mode(FailureMode::Always)
    }

    /// Transport failing every send of one template while the other
    /// template succeeds.
    pub fn failing_template(template: TemplateKind) -> Self {
        Self::with_mode(FailureMode::Template(template))
    }

    fn with_mode(mode: FailureMode) -> Self {
        Self {
            mode,
            attempts: AtomicU64::new(0),
            attempts_per_message: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Total send attempts across all messages.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Messages delivered successfully, in completion order.
    pub fn delivered(&self) -> Vec<NotificationMessage> {
        self.delivered
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Record an attempt for the message and return its 1-based attempt
    /// number. Messages are keyed by template so the two payloads of one
    /// dispatch are counted independently.
    fn record_attempt(&self, message: &NotificationMessage) -> u32 {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let key = message.template.as_str().to_string();
        let mut counts = self
            .attempts_per_message
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock");
        if let Some((_, count)) = counts.iter_mut().find(|(k, _)| *k == key) {
            *count += 1;
            *count
        } else {
            counts.push((key, 1));
            1
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationTransport for MockTransport {
    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError> {
        let attempt = self.record_attempt(message);

        let fail = match self.mode {
            FailureMode::None => false,
            FailureMode::FirstAttempts(n) => attempt <= n,
            FailureMode::Always => true,
            FailureMode::Template(template) => message.template == template,
        };

        if fail {
            return Err(TransportError::DeliveryFailed(format!(
                "scripted failure on attempt {attempt}"
            )));
        }

        self.delivered
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .push(message.clone());
        Ok(())
    }
}
