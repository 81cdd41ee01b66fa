//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod clock;
pub mod registry;
pub mod transport;

pub use clock::MockClock;
pub use registry::UnavailableRegistry;
pub use transport::MockTransport;
