//! Interactive session shell.
//!
//! Reads one command per line, hands it to the reconciliation engine and
//! prints what happened. The registry is saved after every command,
//! including ones rejected before reaching the engine, and again on the
//! way out. Blank lines and `help` are not commands and save nothing.

use std::io::{self, BufRead, Write};

use remote_sessions_core::{
    Intent, Multiplexer, Outcome, RegistryStore, RemoteExecutor, SessionName, StorageError,
};
use remote_sessions_registry::{
    ActionReport, EngineError, HostRefresh, RefreshResult, ReconciliationEngine, SessionRegistry,
};

use crate::command::{HELP, ParseError, ShellCommand, parse_line};

/// Printed before each line is read.
pub const PROMPT: &str = "(session manager)> ";

const RENAME_PROMPT: &str = "New name: ";

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The shell: an engine plus the registry it reconciles and where that
/// registry is persisted.
pub struct SessionShell<E, M>
where
    E: RemoteExecutor,
    M: Multiplexer,
{
    engine: ReconciliationEngine<E, M>,
    registry: SessionRegistry,
    store: Box<dyn RegistryStore>,
}

impl<E, M> SessionShell<E, M>
where
    E: RemoteExecutor,
    M: Multiplexer,
{
    /// Load the registry from `store` and wrap it around `engine`.
    ///
    /// # Errors
    /// Returns error if the stored registry cannot be read.
    pub async fn open(
        engine: ReconciliationEngine<E, M>,
        store: Box<dyn RegistryStore>,
    ) -> Result<Self, StorageError> {
        let registry = SessionRegistry::load(store.as_ref()).await?;
        tracing::debug!(sessions = registry.len(), "Registry loaded");
        Ok(Self {
            engine,
            registry,
            store,
        })
    }

    #[must_use]
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Read and execute lines until `exit` or end of input.
    ///
    /// # Errors
    /// Returns error only if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, input: &mut R, out: &mut W) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(out, "Welcome")?;
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                self.finish(out).await?;
                return Ok(());
            }

            if self.run_line(&line, input, out).await? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Execute a single line. `input` is only read when the command needs
    /// a follow-up answer, such as the new name for `rename`.
    ///
    /// # Errors
    /// Returns error only if reading input or writing output fails.
    pub async fn run_line<R, W>(&mut self, line: &str, input: &mut R, out: &mut W) -> io::Result<Flow>
    where
        R: BufRead,
        W: Write,
    {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(line = line.trim(), "Rejected input: {e}");
                writeln!(out, "{e}")?;
                self.persist(out).await?;
                return Ok(Flow::Continue);
            }
        };

        let intent = match command {
            ShellCommand::Empty => return Ok(Flow::Continue),
            ShellCommand::Help => {
                print_help(out)?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Quit => {
                self.finish(out).await?;
                return Ok(Flow::Exit);
            }
            ShellCommand::Rename(old) => match self.prompt_rename(old, input, out)? {
                Some(intent) => intent,
                None => {
                    self.persist(out).await?;
                    return Ok(Flow::Continue);
                }
            },
            other => match other.into_intent() {
                Some(intent) => intent,
                None => return Ok(Flow::Continue),
            },
        };

        match self.engine.perform_action(&mut self.registry, intent).await {
            Ok(report) => render_report(&report, out)?,
            Err(e) => self.render_error(&e, out)?,
        }
        self.persist(out).await?;
        writeln!(out)?;
        Ok(Flow::Continue)
    }

    fn prompt_rename<R, W>(
        &self,
        old: SessionName,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Option<Intent>>
    where
        R: BufRead,
        W: Write,
    {
        if !self.registry.contains(old.as_str()) {
            self.render_error(&EngineError::SessionNotFound(old), out)?;
            return Ok(None);
        }

        write!(out, "{RENAME_PROMPT}")?;
        out.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        match SessionName::parse(&answer) {
            Ok(new) => Ok(Some(Intent::Rename { old, new })),
            Err(e) => {
                writeln!(out, "{}", ParseError::from(e))?;
                Ok(None)
            }
        }
    }

    async fn persist<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Err(e) = self.registry.save(self.store.as_ref()).await {
            tracing::error!("Failed to save sessions: {e}");
            writeln!(out, "Failed to save sessions: {e}")?;
        }
        Ok(())
    }

    async fn finish<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.persist(out).await?;
        writeln!(out, "Goodbye!")?;
        out.flush()
    }

    fn render_error<W: Write>(&self, err: &EngineError, out: &mut W) -> io::Result<()> {
        writeln!(out, "{err}")?;
        if let EngineError::SessionNotFound(name) = err {
            let candidates: Vec<&str> = self
                .registry
                .complete(name.as_str())
                .into_iter()
                .map(SessionName::as_str)
                .collect();
            if !candidates.is_empty() {
                writeln!(out, "Did you mean: {}?", candidates.join(", "))?;
            }
        }
        Ok(())
    }
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    for (usage, summary) in HELP {
        writeln!(out, "  {usage:width$}  {summary}")?;
    }
    Ok(())
}

fn render_report<W: Write>(report: &ActionReport, out: &mut W) -> io::Result<()> {
    match report {
        ActionReport::Listing {
            entries,
            show_hosts,
        } => {
            if entries.is_empty() {
                return writeln!(out, "No sessions found");
            }
            let width = entries
                .iter()
                .map(|e| e.name.as_str().len())
                .max()
                .unwrap_or(0);
            for (i, entry) in entries.iter().enumerate() {
                if *show_hosts {
                    writeln!(out, "{i}: {:width$}  |  {}", entry.name.as_str(), entry.host)?;
                } else {
                    writeln!(out, "{i}: {}", entry.name)?;
                }
            }
            Ok(())
        }
        ActionReport::Created { name, host } => {
            writeln!(out, "Created session {name} on host {host}")
        }
        ActionReport::Attached {
            name,
            host,
            removed: true,
            ..
        } => writeln!(out, "Session {name} on host {host} has ended"),
        ActionReport::Attached { name, outcome, .. } => {
            if *outcome == Outcome::Detached {
                writeln!(out, "Detached from {name}")
            } else {
                Ok(())
            }
        }
        ActionReport::Killed { name, host, .. } => {
            writeln!(out, "Killed session {name} on host {host}")
        }
        ActionReport::KilledAll { killed, failed } => {
            if killed.is_empty() && failed.is_empty() {
                return writeln!(out, "No sessions found");
            }
            for entry in killed {
                writeln!(out, "Killed session {} on host {}", entry.name, entry.host)?;
            }
            for (name, e) in failed {
                writeln!(out, "Failed to kill {name}: {e}")?;
            }
            Ok(())
        }
        ActionReport::Renamed { old, new, .. } => writeln!(out, "Renamed {old} to {new}"),
        ActionReport::Refreshed(hosts) => {
            for host in hosts {
                render_refresh(host, out)?;
            }
            Ok(())
        }
    }
}

fn render_refresh<W: Write>(refresh: &HostRefresh, out: &mut W) -> io::Result<()> {
    let host = &refresh.host;
    match &refresh.result {
        RefreshResult::Found(names) => {
            for name in names {
                writeln!(out, "Found session {name} on host {host}")?;
            }
            Ok(())
        }
        RefreshResult::NoSessions => writeln!(out, "No sessions found on host {host}"),
        // A failed listing leaves the host empty, same as an idle one.
        RefreshResult::Unavailable(e) => writeln!(out, "No sessions found on host {host} ({e})"),
    }
}
