//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Admission limiter (per-source gating)
//! - Registration coordinator (submission state machine)
//! - Notification dispatcher (retried, detached delivery)
//! - Metrics (outcome counters)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod coordinator;
pub mod dispatcher;
pub mod limiter;
pub mod metrics;
pub mod ports;
