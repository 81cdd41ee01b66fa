//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the
//! application layer needs. Infrastructure adapters implement these ports:
//! `SystemClock` and `ShardedStorage` for the synchronous ports, and the
//! deployment's durable store and mail transport for the async ones
//! (`InMemoryRegistry` ships as a reference registry adapter).

use crate::domain::entry::{PendingEntry, Position, WaitlistEntry};
use crate::domain::notification::NotificationMessage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Monotonic time drives admission windows; wall-clock time stamps entries.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current monotonic instant.
    fn now(&self) -> Instant;

    /// Get the current wall-clock time.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Port for concurrent key-value storage.
///
/// Used by the admission limiter for per-source window state. `with_entry_mut`
/// must hold exclusive access to one entry for the duration of the accessor
/// while leaving other keys free of contention.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Outcome of an atomic insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The entry was created with a freshly assigned position
    Created(WaitlistEntry),
    /// An entry with the same email already exists
    AlreadyExists {
        /// Position of the existing entry
        position: Position,
    },
}

/// Error raised by a registry adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The durable store could not complete the operation
    Unavailable(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Unavailable(reason) => {
                write!(f, "registry unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Port for the durable waitlist store.
///
/// `insert_if_absent` is the unit of atomicity: position assignment and the
/// existence check must be linearizable with all other registry operations.
/// Two concurrent inserts for the same email yield exactly one `Created`;
/// concurrent inserts for distinct emails receive distinct, gap-free
/// positions. A failed insert leaves no partial entry behind.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Atomically insert the entry if no entry with its email exists,
    /// assigning `count-at-transaction-time + 1` as its position.
    async fn insert_if_absent(
        &self,
        pending: PendingEntry,
    ) -> Result<InsertOutcome, RegistryError>;

    /// Look up an entry by its normalized email.
    async fn lookup_by_email(&self, email: &str) -> Result<Option<WaitlistEntry>, RegistryError>;

    /// List up to `limit` entries, newest `joined_at` first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<WaitlistEntry>, RegistryError>;

    /// Count all entries.
    async fn count_all(&self) -> Result<u64, RegistryError>;
}

/// Error raised by a notification transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport attempted delivery and failed
    DeliveryFailed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::DeliveryFailed(reason) => {
                write!(f, "notification delivery failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Port for the concrete notification transport (SMTP relay, hosted API).
///
/// A single send operation; retry, backoff, and failure isolation are owned
/// by the dispatcher, never by the transport.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Attempt to deliver one message.
    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError>;
}
