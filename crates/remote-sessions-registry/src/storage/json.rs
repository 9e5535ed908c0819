//! JSON file registry storage.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use remote_sessions_core::{RegistryStore, SessionEntry, StorageError};
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    sessions: Vec<SessionEntry>,
}

/// Registry stored as a JSON document on disk.
///
/// There is no locking: two shells sharing a file are last-writer-wins.
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-save leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl RegistryStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<SessionEntry>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No registry file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let file: RegistryFile =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        if file.version != FORMAT_VERSION {
            return Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: format!("unsupported version {}", file.version),
            });
        }
        Ok(file.sessions)
    }

    async fn save(&self, entries: &[SessionEntry]) -> Result<(), StorageError> {
        let file = RegistryFile {
            version: FORMAT_VERSION,
            sessions: entries.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), sessions = entries.len(), "Saved registry");
        Ok(())
    }
}
