//! tmux adapter.
//!
//! tmux has no exit code that separates "the user detached" from "the
//! session ended", but it prints `[detached ...]` or `[exited]` as the
//! client leaves. The adapter looks for that banner on the last line of
//! the terminal output and falls back to the exit code otherwise.

use std::borrow::Cow;

use remote_sessions_core::{
    ExecOutput, Listing, Multiplexer, MultiplexerError, Outcome, RemoteCommand, SessionName,
};

const DETACHED_MARKER: &str = "[detached";
const EXITED_MARKER: &str = "[exited";

/// What `list-sessions` prints on stderr when no server is running.
const NO_SERVER_MARKERS: [&str; 3] = ["no server running", "failed to connect", "error connecting"];

/// `Multiplexer` for tmux.
#[derive(Debug, Clone)]
pub struct TmuxAdapter {
    program: String,
}

impl Default for TmuxAdapter {
    fn default() -> Self {
        Self::new("tmux")
    }
}

impl TmuxAdapter {
    /// Create an adapter invoking `program` on the remote host.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn line<'a>(&self, args: impl IntoIterator<Item = Cow<'a, str>>) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

fn quote(name: &SessionName) -> Result<Cow<'_, str>, MultiplexerError> {
    shlex::try_quote(name.as_str()).map_err(|e| MultiplexerError::Quote(e.to_string()))
}

impl Multiplexer for TmuxAdapter {
    fn new_session(&self, name: &SessionName) -> Result<RemoteCommand, MultiplexerError> {
        Ok(RemoteCommand::interactive(self.line([
            "new-session".into(),
            "-s".into(),
            quote(name)?,
        ])))
    }

    fn attach(&self, name: Option<&SessionName>) -> Result<RemoteCommand, MultiplexerError> {
        let line = match name {
            Some(name) => self.line(["attach".into(), "-t".into(), quote(name)?]),
            None => self.line(["attach".into()]),
        };
        Ok(RemoteCommand::interactive(line))
    }

    fn rename(
        &self,
        old: &SessionName,
        new: &SessionName,
    ) -> Result<RemoteCommand, MultiplexerError> {
        Ok(RemoteCommand::interactive(self.line([
            "rename-session".into(),
            "-t".into(),
            quote(old)?,
            quote(new)?,
        ])))
    }

    fn kill(&self, name: &SessionName) -> Result<RemoteCommand, MultiplexerError> {
        Ok(RemoteCommand::interactive(self.line([
            "kill-session".into(),
            "-t".into(),
            quote(name)?,
        ])))
    }

    fn list(&self) -> Result<RemoteCommand, MultiplexerError> {
        Ok(RemoteCommand::captured(self.line(["list-sessions".into()])))
    }

    fn interpret(&self, output: &ExecOutput) -> Outcome {
        // Screen contents before the banner must not count.
        let banner = output
            .output_str()
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        if banner.contains(DETACHED_MARKER) {
            Outcome::Detached
        } else if banner.contains(EXITED_MARKER) {
            Outcome::RemoteExited
        } else {
            Outcome::from_status(output.status)
        }
    }

    fn parse_listing(&self, output: &ExecOutput) -> Listing {
        if !output.status.success() {
            let errors = output.errors_str();
            if NO_SERVER_MARKERS.iter().any(|marker| errors.contains(marker)) {
                return Listing::NoServer;
            }
            return Listing::Failed(output.status);
        }

        let names = output
            .output_str()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                // `name: 1 windows (created ...)`
                let raw = line.split(':').next().unwrap_or(line);
                match SessionName::parse(raw) {
                    Ok(name) => Some(name),
                    Err(e) => {
                        tracing::warn!(line, "Skipping unusable session name: {e}");
                        None
                    }
                }
            })
            .collect();
        Listing::Sessions(names)
    }
}
