//! Core traits for remote execution, multiplexer adapters and registry storage.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExecOutput, ExecStatus, NameError, Outcome, SessionName};

/// How a remote command is attached to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Inherit the caller's terminal; a pseudo-terminal is requested remotely.
    Interactive,
    /// Capture stdout and return it as text.
    Captured,
}

/// A command line to run in a login shell on a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub line: String,
    pub mode: ExecMode,
}

impl RemoteCommand {
    #[must_use]
    pub fn interactive(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            mode: ExecMode::Interactive,
        }
    }

    #[must_use]
    pub fn captured(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            mode: ExecMode::Captured,
        }
    }
}

/// Executor error.
///
/// These are failures to get the transport going at all. A transport that
/// started and then failed is reported through [`ExecStatus`] instead.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Refusing to run command: {0}")]
    Rejected(#[from] NameError),
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for remote-execution transports.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` on `host` and wait for it to finish.
    async fn run(&self, host: &str, command: &RemoteCommand) -> Result<ExecOutput, ExecutorError>;
}

/// Multiplexer command build error.
#[derive(Debug, Error)]
pub enum MultiplexerError {
    #[error("Failed to quote argument: {0}")]
    Quote(String),
}

/// Sessions reported by a host's multiplexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Session names in the order the multiplexer listed them.
    Sessions(Vec<SessionName>),
    /// The multiplexer reported it has nothing running.
    NoServer,
    /// The listing command itself failed.
    Failed(ExecStatus),
}

/// Trait for terminal multiplexer adapters.
///
/// Builds the command line for each intent and turns raw results into an
/// [`Outcome`]. Anything multiplexer-specific, output sniffing included,
/// stays behind this trait.
pub trait Multiplexer: Send + Sync {
    /// Create a session and attach to it.
    fn new_session(&self, name: &SessionName) -> Result<RemoteCommand, MultiplexerError>;

    /// Attach to `name`, or to the most recent session when `None`.
    fn attach(&self, name: Option<&SessionName>) -> Result<RemoteCommand, MultiplexerError>;

    /// Rename a session.
    fn rename(
        &self,
        old: &SessionName,
        new: &SessionName,
    ) -> Result<RemoteCommand, MultiplexerError>;

    /// Kill a session.
    fn kill(&self, name: &SessionName) -> Result<RemoteCommand, MultiplexerError>;

    /// List sessions on the host.
    fn list(&self) -> Result<RemoteCommand, MultiplexerError>;

    /// Interpret the result of new, attach, rename or kill.
    fn interpret(&self, output: &ExecOutput) -> Outcome;

    /// Interpret the result of list.
    fn parse_listing(&self, output: &ExecOutput) -> Listing;
}

/// One registry record: a session and the host believed to own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub name: SessionName,
    pub host: String,
}

impl SessionEntry {
    #[must_use]
    pub fn new(name: SessionName, host: impl Into<String>) -> Self {
        Self {
            name,
            host: host.into(),
        }
    }
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Registry file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for registry persistence backends.
///
/// Entries are stored in the order given, most recently used first.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load all entries; an absent store yields an empty list.
    async fn load(&self) -> Result<Vec<SessionEntry>, StorageError>;

    /// Replace the stored entries.
    async fn save(&self, entries: &[SessionEntry]) -> Result<(), StorageError>;
}
