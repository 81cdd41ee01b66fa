//! Mock registry for testing storage-failure paths.

use crate::application::ports::{InsertOutcome, Registry, RegistryError};
use crate::domain::entry::{PendingEntry, WaitlistEntry};
use async_trait::async_trait;

/// Registry on which every operation fails with
/// [`RegistryError::Unavailable`].
///
/// Lets tests drive the coordinator's internal-error path without touching
/// real storage.
#[derive(Debug, Default)]
pub struct UnavailableRegistry;

impl UnavailableRegistry {
    /// Create a new always-failing registry.
    pub fn new() -> Self {
        Self
    }

    fn error() -> RegistryError {
        RegistryError::Unavailable("scripted outage".to_string())
    }
}

#[async_trait]
impl Registry for UnavailableRegistry {
    async fn insert_if_absent(
        &self,
        _pending: PendingEntry,
    ) -> Result<InsertOutcome, RegistryError> {
        Err(Self::error())
    }

    async fn lookup_by_email(&self, _email: &str) -> Result<Option<WaitlistEntry>, RegistryError> {
        Err(Self::error())
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<WaitlistEntry>, RegistryError> {
        Err(Self::error())
    }

    async fn count_all(&self) -> Result<u64, RegistryError> {
        Err(Self::error())
    }
}
