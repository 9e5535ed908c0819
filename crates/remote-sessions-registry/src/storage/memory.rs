//! In-memory registry storage.

use std::sync::RwLock;

use async_trait::async_trait;
use remote_sessions_core::{RegistryStore, SessionEntry, StorageError};

/// In-memory storage implementation.
///
/// Useful for tests and throwaway shells. Data is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Option<Vec<SessionEntry>>>,
}

impl MemoryStore {
    /// Create an empty store, as if nothing had been saved yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `entries`.
    #[must_use]
    pub fn with_entries(entries: Vec<SessionEntry>) -> Self {
        Self {
            entries: RwLock::new(Some(entries)),
        }
    }

    /// Whether `save` has been called at least once.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.entries.read().map(|e| e.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn load(&self) -> Result<Vec<SessionEntry>, StorageError> {
        Ok(self
            .entries
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .clone()
            .unwrap_or_default())
    }

    async fn save(&self, entries: &[SessionEntry]) -> Result<(), StorageError> {
        *self
            .entries
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))? = Some(entries.to_vec());
        Ok(())
    }
}
