//! # waitlist-core
//!
//! Race-free sign-up waitlist registration.
//!
//! This crate registers prospective users on a waitlist, guaranteeing each
//! accepted identity (email) a unique, strictly increasing position number
//! and exactly-once acceptance. Around that core it provides input
//! normalization, per-source rate limiting, and best-effort notification
//! dispatch with bounded retries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waitlist_core::{
//!     AdmissionConfig, AdmissionLimiter, InMemoryRegistry, Metrics,
//!     NotificationDispatcher, RegistrationCoordinator, RegistrationOutcome,
//!     ShardedStorage, SubmissionRequest, SystemClock,
//! };
//!
//! # async fn run() {
//! let clock = Arc::new(SystemClock::new());
//! let metrics = Metrics::new();
//!
//! let limiter = AdmissionLimiter::with_metrics(
//!     Arc::new(ShardedStorage::new()),
//!     clock.clone(),
//!     AdmissionConfig::default(), // 5 attempts per 15 minutes
//!     metrics.clone(),
//! );
//!
//! // No transport configured: notifications become logged no-ops until
//! // `dispatcher.reinitialize(...)` installs one.
//! let dispatcher = Arc::new(NotificationDispatcher::unconfigured(
//!     "admin@example.com",
//!     metrics.clone(),
//! ));
//!
//! let coordinator = RegistrationCoordinator::new(
//!     Arc::new(InMemoryRegistry::with_clock(clock)),
//!     limiter,
//!     dispatcher,
//!     metrics,
//! );
//!
//! let outcome = coordinator
//!     .register(SubmissionRequest {
//!         email: "User@Example.com".to_string(),
//!         twitter: Some("bob".to_string()),
//!         source_address: "203.0.113.9".to_string(),
//!         client_agent: "curl/8.5".to_string(),
//!         ..SubmissionRequest::default()
//!     })
//!     .await;
//!
//! match outcome {
//!     RegistrationOutcome::Registered(entry) => {
//!         println!("position #{}", entry.position);
//!     }
//!     RegistrationOutcome::AlreadyRegistered { position } => {
//!         println!("already registered at #{position}");
//!     }
//!     other => println!("{}: {}", other.kind(), other.message()),
//! }
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Positions**: accepted entries receive positions `1..=N` with no gaps,
//!   no reuse, and no duplicates, at any concurrency level. Position order
//!   reflects registry-serialization order, not arrival wall-clock order.
//! - **Identity**: emails are trimmed and lowercased before use as the
//!   identity key; `"Foo@Bar.com"` and `"foo@bar.com"` are the same
//!   registrant. Exactly one submission per identity is `Registered`; the
//!   rest idempotently report the existing position.
//! - **Isolation**: notification delivery is detached from the request path.
//!   A send failure is retried with exponential backoff (up to 3 attempts,
//!   `min(10s, 1s * 2^n)` between tries) and then dropped with a logged
//!   record; it never affects the registration outcome.
//! - **No partial state**: a storage failure aborts the submission with no
//!   entry left behind.
//!
//! ## Rate limiting
//!
//! The [`AdmissionLimiter`] caps attempts per source address (default 5 per
//! 15 minutes) before any durable-store access. Rejections report how long
//! the source must wait. Window state is in-memory only; it is reset by a
//! process restart and is per-instance in multi-instance deployments.
//!
//! ## Ports
//!
//! The durable store and the mail transport are collaborators behind the
//! [`Registry`] and [`NotificationTransport`] ports. [`InMemoryRegistry`]
//! ships as a reference registry adapter; a database-backed adapter must
//! provide the same linearizable insert-if-absent semantics.
//!
//! ## Observability
//!
//! Every outcome is logged through `tracing` and counted in [`Metrics`]:
//!
//! ```rust,no_run
//! # use waitlist_core::Metrics;
//! # let metrics = Metrics::new();
//! let snapshot = metrics.snapshot();
//! println!("accepted: {}", snapshot.registered);
//! println!("duplicates: {}", snapshot.duplicates);
//! println!("acceptance rate: {:.2}%", snapshot.acceptance_rate() * 100.0);
//! println!("notifications dropped: {}", snapshot.notifications_dropped);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    admission::{AdmissionDecision, AdmissionWindow},
    entry::{EntrySummary, PendingEntry, Position, WaitlistEntry},
    notification::{NotificationMessage, TemplateKind},
    submission::{normalize, NormalizedSubmission, SubmissionRequest, ValidationError},
};

pub use application::{
    coordinator::{RegistrationCoordinator, RegistrationOutcome, WaitlistStats},
    dispatcher::{DispatchHandle, DispatcherStatus, NotificationDispatcher, RetryPolicy},
    limiter::{AdmissionConfig, AdmissionConfigError, AdmissionLimiter},
    metrics::{Metrics, MetricsSnapshot},
    ports::{
        Clock, InsertOutcome, NotificationTransport, Registry, RegistryError, Storage,
        TransportError,
    },
};

pub use infrastructure::{
    clock::SystemClock, memory_registry::InMemoryRegistry, storage::ShardedStorage,
};

#[cfg(feature = "test-helpers")]
pub use infrastructure::mocks::{MockClock, MockTransport, UnavailableRegistry};
