//! Ordered session registry.

use remote_sessions_core::{RegistryStore, SessionEntry, SessionName, StorageError};

/// In-memory mapping from session name to owning host.
///
/// Names are unique. Entries are kept most recently used first: `put`,
/// `rename` and `promote` move an entry to the front, lookups never reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRegistry {
    entries: Vec<SessionEntry>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored entries, keeping the first of any
    /// repeated name.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = SessionEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            if registry.contains(entry.name.as_str()) {
                tracing::warn!(session = %entry.name, "Dropping duplicate registry entry");
                continue;
            }
            registry.entries.push(entry);
        }
        registry
    }

    /// Load the registry from a store.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn load(store: &dyn RegistryStore) -> Result<Self, StorageError> {
        let registry = Self::from_entries(store.load().await?);
        tracing::debug!(sessions = registry.len(), "Loaded session registry");
        Ok(registry)
    }

    /// Persist the registry to a store.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    pub async fn save(&self, store: &dyn RegistryStore) -> Result<(), StorageError> {
        store.save(&self.entries).await
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.as_str() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Host owning `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].host.as_str())
    }

    /// Insert or overwrite `name`, moving it to the front.
    pub fn put(&mut self, name: SessionName, host: impl Into<String>) {
        if let Some(i) = self.position(name.as_str()) {
            self.entries.remove(i);
        }
        self.entries.insert(0, SessionEntry::new(name, host));
    }

    /// Remove `name`; absent names are ignored.
    pub fn remove(&mut self, name: &str) -> Option<SessionEntry> {
        self.position(name).map(|i| self.entries.remove(i))
    }

    /// Move `old` to `new`, keeping its host and placing it at the front.
    ///
    /// An existing `new` entry is replaced. Returns false when `old` is not
    /// registered.
    pub fn rename(&mut self, old: &str, new: SessionName) -> bool {
        let Some(entry) = self.remove(old) else {
            return false;
        };
        self.put(new, entry.host);
        true
    }

    /// Move `name` to the front. Returns false when it is not registered.
    pub fn promote(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(0) => true,
            Some(i) => {
                let entry = self.entries.remove(i);
                self.entries.insert(0, entry);
                true
            }
            None => false,
        }
    }

    /// Remove every entry attributed to `host`, returning their names.
    pub fn remove_host(&mut self, host: &str) -> Vec<SessionName> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if e.host == host {
                removed.push(e.name.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, most recently used first.
    #[must_use]
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Snapshot of registered names, most recently used first.
    #[must_use]
    pub fn names(&self) -> Vec<SessionName> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Registered names starting with `prefix`.
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Vec<&SessionName> {
        self.entries
            .iter()
            .map(|e| &e.name)
            .filter(|n| n.as_str().starts_with(prefix))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
