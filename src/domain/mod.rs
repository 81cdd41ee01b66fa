//! Domain layer - pure business logic with no I/O or shared state.
//!
//! This layer contains the core concepts and invariants of the waitlist:
//! - Submission normalization and validation
//! - Waitlist entry types and the position invariant
//! - Admission window accounting
//! - Notification message templates
//!
//! All types in this layer are pure and easily testable.

pub mod admission;
pub mod entry;
pub mod notification;
pub mod submission;
