//! In-memory registry adapter.
//!
//! Reference implementation of the [`Registry`] port. Entries live in a
//! sharded map for lock-free reads; inserts run under a single mutex so the
//! existence check and position assignment form one critical section. A
//! deployment backed by a real database must provide the same linearizable
//! insert, for example through a unique index plus a transactional counter.

use crate::application::ports::{Clock, InsertOutcome, Registry, RegistryError};
use crate::domain::entry::{PendingEntry, Position, WaitlistEntry};
use crate::infrastructure::clock::SystemClock;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Registry keeping all entries in process memory.
#[derive(Debug)]
pub struct InMemoryRegistry {
    entries: DashMap<String, WaitlistEntry>,
    /// Count of accepted entries; the mutex serializes position assignment.
    accepted: Mutex<Position>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRegistry {
    /// Create an empty registry stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create an empty registry stamped by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            accepted: Mutex::new(0),
            clock,
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn insert_if_absent(
        &self,
        pending: PendingEntry,
    ) -> Result<InsertOutcome, RegistryError> {
        // Single serialization point: duplicate check, position assignment,
        // and insert all happen under this lock. Reads stay lock-free.
        let mut accepted = self
            .accepted
            .lock()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))?;

        if let Some(existing) = self.entries.get(&pending.email) {
            return Ok(InsertOutcome::AlreadyExists {
                position: existing.position,
            });
        }

        let position = *accepted + 1;
        let entry = pending.into_entry(position, self.clock.utc_now());
        self.entries.insert(entry.email.clone(), entry.clone());
        *accepted = position;

        Ok(InsertOutcome::Created(entry))
    }

    async fn lookup_by_email(&self, email: &str) -> Result<Option<WaitlistEntry>, RegistryError> {
        Ok(self.entries.get(email).map(|entry| entry.clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<WaitlistEntry>, RegistryError> {
        let mut entries: Vec<WaitlistEntry> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Newest first; position breaks ties between same-instant joins.
        entries.sort_by(|a, b| {
            b.joined_at
                .cmp(&a.joined_at)
                .then_with(|| b.position.cmp(&a.position))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn count_all(&self) -> Result<u64, RegistryError> {
        Ok(self.entries.len() as u64)
    }
}
