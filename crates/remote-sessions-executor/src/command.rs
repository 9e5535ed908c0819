//! Command building utilities.

use thiserror::Error;

/// Command build error.
#[derive(Debug, Error)]
pub enum CommandBuildError {
    #[error("Base command cannot be parsed: {0}")]
    InvalidBase(String),
    #[error("Base command is empty after parsing")]
    EmptyCommand,
}

/// Parsed command parts (program + args).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParts {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandParts {
    /// Create new command parts.
    #[must_use]
    pub const fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

/// Builder for local transport invocations.
///
/// The base may carry its own arguments (`"ssh -F ~/.ssh/work"`); it is
/// split with shell rules before the parameters are appended.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// Base executable command.
    pub base: String,
    /// Optional parameters to append.
    pub params: Option<Vec<String>>,
}

impl CommandBuilder {
    /// Create a new command builder.
    #[must_use]
    pub fn new<S: Into<String>>(base: S) -> Self {
        Self {
            base: base.into(),
            params: None,
        }
    }

    /// Add parameters.
    #[must_use]
    pub fn params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Extend parameters.
    #[must_use]
    pub fn extend_params<I>(mut self, more: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let extra: Vec<String> = more.into_iter().map(Into::into).collect();
        match &mut self.params {
            Some(p) => p.extend(extra),
            None => self.params = Some(extra),
        }
        self
    }

    /// Build the final command with trailing arguments.
    ///
    /// # Errors
    /// Returns error if the base cannot be split or nothing is left.
    pub fn build(&self, additional_args: &[String]) -> Result<CommandParts, CommandBuildError> {
        let mut parts = split_command_line(&self.base)?;
        if let Some(ref params) = self.params {
            parts.extend(params.iter().cloned());
        }
        parts.extend(additional_args.iter().cloned());

        if parts.is_empty() {
            return Err(CommandBuildError::EmptyCommand);
        }

        let program = parts.remove(0);
        Ok(CommandParts::new(program, parts))
    }
}

fn split_command_line(input: &str) -> Result<Vec<String>, CommandBuildError> {
    shlex::split(input).ok_or_else(|| CommandBuildError::InvalidBase(input.to_string()))
}

/// Escape `input` for use between double quotes in a POSIX shell.
///
/// `"` must be escaped so the command cannot close the quoted argument;
/// `\`, `$` and `` ` `` are escaped because they stay live inside double
/// quotes.
#[must_use]
pub fn escape_double_quoted(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wrap `line` so the remote side runs it inside a login shell.
#[must_use]
pub fn login_shell_invocation(login_shell: &str, line: &str) -> String {
    format!("{login_shell} -lc \"{}\"", escape_double_quoted(line))
}
