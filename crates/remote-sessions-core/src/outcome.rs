//! Remote execution results and their interpretation.

use std::fmt;

/// How the remote-execution transport finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The remote command ran and exited with this code.
    Exited(i32),
    /// The remote shell could not find the command (exit 127).
    CommandNotFound,
    /// The transport reported its own failure code or was killed by a signal.
    ///
    /// The remote command may also have exited with that same code, so this
    /// cannot be attributed to either side.
    TransportSuspect(Option<i32>),
}

impl ExecStatus {
    /// The raw exit code, when there is one.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(code),
            Self::CommandNotFound => Some(127),
            Self::TransportSuspect(code) => code,
        }
    }

    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

/// Result of running one command on a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub status: ExecStatus,
    /// Captured stdout (captured mode) or the trailing stdout of the
    /// terminal session (interactive mode).
    pub output: Option<String>,
    /// Captured stderr. Interactive mode leaves stderr on the terminal.
    pub errors: Option<String>,
}

impl ExecOutput {
    #[must_use]
    pub const fn new(status: ExecStatus, output: Option<String>) -> Self {
        Self {
            status,
            output,
            errors: None,
        }
    }

    /// Attach captured stderr.
    #[must_use]
    pub fn with_errors(mut self, errors: impl Into<String>) -> Self {
        self.errors = Some(errors.into());
        self
    }

    /// Shorthand for a plain exit code with no output.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self::new(ExecStatus::Exited(code), None)
    }

    #[must_use]
    pub fn output_str(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn errors_str(&self) -> &str {
        self.errors.as_deref().unwrap_or_default()
    }
}

/// Interpreted result of one multiplexer invocation.
///
/// Every registry mutation performed by the engine is conditioned on one of
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user detached; the session lives on.
    Detached,
    /// The session ended while we were attached to it.
    RemoteExited,
    /// Exit code 0.
    OkNormal,
    /// Exit code 1; for tmux this is "can't find session".
    NotFound,
    /// The login shell could not find the multiplexer binary (exit 127).
    CommandNotFound,
    /// Any other exit code from the remote command.
    Error(i32),
    /// The transport's own failure code; see [`ExecStatus::TransportSuspect`].
    TransportError(Option<i32>),
}

impl Outcome {
    /// Map an exit status to an outcome, ignoring output.
    #[must_use]
    pub const fn from_status(status: ExecStatus) -> Self {
        match status {
            ExecStatus::Exited(0) => Self::OkNormal,
            ExecStatus::Exited(1) => Self::NotFound,
            ExecStatus::Exited(code) => Self::Error(code),
            ExecStatus::CommandNotFound => Self::CommandNotFound,
            ExecStatus::TransportSuspect(code) => Self::TransportError(code),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("detached"),
            Self::RemoteExited => f.write_str("exited"),
            Self::OkNormal => f.write_str("ok"),
            Self::NotFound => f.write_str("not found"),
            Self::CommandNotFound => f.write_str("command not found"),
            Self::Error(code) => write!(f, "error (exit {code})"),
            Self::TransportError(Some(code)) => write!(f, "transport error (exit {code})"),
            Self::TransportError(None) => f.write_str("transport error (no exit code)"),
        }
    }
}
