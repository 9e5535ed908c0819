//! Shell command parsing.
//!
//! Turns one input line into a [`ShellCommand`]. Names are validated here,
//! so a line with an illegal character never becomes an intent.

use remote_sessions_core::{HostFilter, Intent, KillTarget, NameError, SessionName};
use thiserror::Error;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    Help,
    /// `exit`, `quit`, `bye`.
    Quit,
    List {
        show_hosts: bool,
    },
    New {
        name: SessionName,
        host: Option<String>,
    },
    Attach(SessionName),
    Kill(KillTarget),
    /// The new name is prompted for separately.
    Rename(SessionName),
    Refresh(HostFilter),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: {0} (type 'help' for a list)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    #[error("Unexpected argument to {command}: {arg}")]
    UnexpectedArgument { command: &'static str, arg: String },

    #[error(transparent)]
    InvalidName(#[from] NameError),
}

const NEW_USAGE: &str = "new <name>[@host]";
const ATTACH_USAGE: &str = "attach <name>";
const KILL_USAGE: &str = "kill <name>|*";
const RENAME_USAGE: &str = "rename <name>";

/// One-line summaries shown by `help`.
pub const HELP: &[(&str, &str)] = &[
    ("ls [-a], list [-a]", "List sessions, most recently used first; -a shows hosts"),
    ("la", "Same as ls -a"),
    (NEW_USAGE, "Create a session on a random or given host and attach"),
    (ATTACH_USAGE, "Attach to a session"),
    (KILL_USAGE, "Kill a session, or every session with *"),
    (RENAME_USAGE, "Rename a session (prompts for the new name)"),
    ("refresh [host|all]", "Rebuild the registry from the hosts' own listings"),
    ("help", "Show this help"),
    ("exit, quit, bye", "Save and leave"),
];

/// Parse one line of input.
///
/// # Errors
/// Returns error for unknown commands, missing arguments and invalid
/// session names.
pub fn parse_line(line: &str) -> Result<ShellCommand, ParseError> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    match verb {
        "" => Ok(ShellCommand::Empty),
        "help" | "?" => no_argument("help", rest, ShellCommand::Help),
        "exit" | "quit" | "bye" => no_argument("exit", rest, ShellCommand::Quit),
        "ls" | "list" => match rest {
            "" => Ok(ShellCommand::List { show_hosts: false }),
            "-a" => Ok(ShellCommand::List { show_hosts: true }),
            other => Err(ParseError::UnexpectedArgument {
                command: "ls",
                arg: other.to_string(),
            }),
        },
        "la" => no_argument("la", rest, ShellCommand::List { show_hosts: true }),
        "new" => parse_new(rest),
        "attach" => Ok(ShellCommand::Attach(required_name(rest, ATTACH_USAGE)?)),
        "kill" => match rest {
            "*" => Ok(ShellCommand::Kill(KillTarget::All)),
            name => Ok(ShellCommand::Kill(KillTarget::Named(required_name(
                name, KILL_USAGE,
            )?))),
        },
        "rename" => Ok(ShellCommand::Rename(required_name(rest, RENAME_USAGE)?)),
        "refresh" => Ok(ShellCommand::Refresh(HostFilter::parse(rest))),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn no_argument(
    command: &'static str,
    rest: &str,
    parsed: ShellCommand,
) -> Result<ShellCommand, ParseError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseError::UnexpectedArgument {
            command,
            arg: rest.to_string(),
        })
    }
}

fn required_name(rest: &str, usage: &'static str) -> Result<SessionName, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingArgument(usage));
    }
    Ok(SessionName::parse(rest)?)
}

// `name@host` targets a host. The first '@' splits, so the host part may
// itself be `user@host`.
fn parse_new(rest: &str) -> Result<ShellCommand, ParseError> {
    let (name, host) = match rest.split_once('@') {
        Some((name, host)) => {
            let host = host.trim();
            if host.is_empty() {
                return Err(ParseError::MissingArgument(NEW_USAGE));
            }
            (name, Some(host.to_string()))
        }
        None => (rest, None),
    };
    Ok(ShellCommand::New {
        name: required_name(name.trim(), NEW_USAGE)?,
        host,
    })
}

impl ShellCommand {
    /// The engine intent for commands that need no further input.
    #[must_use]
    pub fn into_intent(self) -> Option<Intent> {
        match self {
            Self::List { show_hosts } => Some(Intent::List { show_hosts }),
            Self::New { name, host } => Some(Intent::Create { name, host }),
            Self::Attach(name) => Some(Intent::Attach { name }),
            Self::Kill(target) => Some(Intent::Kill(target)),
            Self::Refresh(filter) => Some(Intent::Refresh(filter)),
            Self::Empty | Self::Help | Self::Quit | Self::Rename(_) => None,
        }
    }
}
