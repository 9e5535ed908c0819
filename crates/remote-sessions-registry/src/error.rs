//! Engine errors.

use remote_sessions_core::{
    ExecutorError, HostError, MultiplexerError, NameError, Outcome, SessionName,
};
use thiserror::Error;

/// Input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Reconciliation engine error.
///
/// None of these are fatal; the registry keeps whatever mutations actually
/// happened before the error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("Session does not exist: {0}")]
    SessionNotFound(SessionName),
    #[error("Session already exists: {0}")]
    SessionAlreadyExists(SessionName),
    #[error("Could not reach {host}: {source}")]
    TransportFailure {
        host: String,
        #[source]
        source: ExecutorError,
    },
    /// The transport's failure code: either the connection to `host` failed
    /// or the remote command itself exited with that code.
    #[error("Connection to {host} failed or the remote command exited with {}", describe_code(.code))]
    AmbiguousFailure { host: String, code: Option<i32> },
    #[error("Multiplexer on {host} failed with exit code {code}")]
    RemoteCommandFailure { host: String, code: i32 },
    #[error("The login shell on {host} could not find the multiplexer command (exit 127)")]
    MultiplexerNotFound { host: String },
    #[error("Session {name} no longer exists on {host}; run 'refresh {host}'")]
    RemoteSessionMissing { name: SessionName, host: String },
    #[error("{action} {name} on {host}: multiplexer reported {outcome}")]
    UnexpectedOutcome {
        action: &'static str,
        name: SessionName,
        host: String,
        outcome: Outcome,
    },
    #[error("Failed to build command: {0}")]
    CommandBuild(#[from] MultiplexerError),
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("code {c}"))
}

impl From<NameError> for EngineError {
    fn from(e: NameError) -> Self {
        Self::InvalidInput(e.into())
    }
}

impl From<HostError> for EngineError {
    fn from(e: HostError) -> Self {
        Self::InvalidInput(e.into())
    }
}

impl EngineError {
    /// Whether the error was raised before anything was sent to a host.
    #[must_use]
    pub const fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::SessionNotFound(_)
                | Self::SessionAlreadyExists(_)
                | Self::CommandBuild(_)
        )
    }
}
