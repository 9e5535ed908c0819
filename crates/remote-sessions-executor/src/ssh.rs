//! Remote execution over the `ssh` client.

use std::process::Stdio;

use async_trait::async_trait;
use remote_sessions_core::{
    ExecMode, ExecOutput, ExecStatus, ExecutorError, NameError, RemoteCommand, RemoteExecutor,
    find_illegal_chars,
};
use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::Command,
};

use crate::{
    command::{CommandBuilder, CommandParts, login_shell_invocation},
    resolve::resolve_executable_path,
};

/// Exit code ssh uses for its own failures.
pub const SSH_FAILURE_CODE: i32 = 255;

/// Exit code a POSIX shell uses for "command not found".
pub const COMMAND_NOT_FOUND_CODE: i32 = 127;

/// Bytes of interactive output kept for outcome sniffing.
const TAIL_BYTES: usize = 1024;

const READ_BUFFER_SIZE: usize = 4096;

/// ssh invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshOptions {
    /// ssh client command, optionally with leading arguments.
    pub program: String,

    /// Request X11 forwarding (`-X`).
    pub forward_x11: bool,

    /// `ConnectTimeout` in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Extra arguments placed before the host.
    pub extra_args: Vec<String>,

    /// Shell the remote command runs in, as a login shell.
    pub login_shell: String,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            forward_x11: true,
            connect_timeout_secs: Some(10),
            extra_args: Vec::new(),
            login_shell: "/bin/sh".to_string(),
        }
    }
}

/// `RemoteExecutor` that shells out to `ssh`.
#[derive(Debug, Clone, Default)]
pub struct SshExecutor {
    options: SshOptions,
}

impl SshExecutor {
    #[must_use]
    pub const fn new(options: SshOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &SshOptions {
        &self.options
    }

    /// Build the local ssh invocation for `command` on `host`.
    ///
    /// # Errors
    /// Returns error if the command contains an illegal character or the
    /// configured program cannot be parsed.
    pub fn build_invocation(
        &self,
        host: &str,
        command: &RemoteCommand,
    ) -> Result<CommandParts, ExecutorError> {
        let illegal = find_illegal_chars(&command.line);
        if !illegal.is_empty() {
            return Err(NameError::IllegalCharacters(illegal).into());
        }

        let mut params = Vec::new();
        if self.options.forward_x11 && command.mode == ExecMode::Interactive {
            params.push("-X".to_string());
        }
        params.push(
            match command.mode {
                ExecMode::Interactive => "-t",
                ExecMode::Captured => "-T",
            }
            .to_string(),
        );
        if let Some(secs) = self.options.connect_timeout_secs {
            params.push("-o".to_string());
            params.push(format!("ConnectTimeout={secs}"));
        }

        CommandBuilder::new(self.options.program.as_str())
            .params(params)
            .extend_params(self.options.extra_args.iter().cloned())
            .build(&[
                host.to_string(),
                login_shell_invocation(&self.options.login_shell, &command.line),
            ])
            .map_err(|e| ExecutorError::SpawnFailed(e.to_string()))
    }

    async fn command(&self, parts: &CommandParts) -> Result<Command, ExecutorError> {
        let program = resolve_executable_path(&parts.program)
            .await
            .ok_or_else(|| ExecutorError::ExecutableNotFound(parts.program.clone()))?;
        let mut cmd = Command::new(program);
        cmd.args(&parts.args).kill_on_drop(true);
        Ok(cmd)
    }

    async fn run_interactive(&self, parts: &CommandParts) -> Result<ExecOutput, ExecutorError> {
        let mut child = self
            .command(parts)
            .await?
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ExecutorError::SpawnFailed(format!("{}: {e}", parts.program)))?;

        let mut remote_out = child
            .stdout
            .take()
            .ok_or_else(|| ExecutorError::SpawnFailed("stdout was not piped".to_string()))?;

        // Forward everything to the user's terminal, keeping only the tail
        // where the multiplexer prints its exit banner.
        let mut local_out = tokio::io::stdout();
        let mut tail = OutputTail::new(TAIL_BYTES);
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = remote_out.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            local_out.write_all(&buf[..n]).await?;
            local_out.flush().await?;
            tail.push(&buf[..n]);
        }

        let status = child.wait().await?;
        Ok(ExecOutput::new(classify_exit(status.code()), Some(tail.into_string())))
    }

    async fn run_captured(&self, parts: &CommandParts) -> Result<ExecOutput, ExecutorError> {
        let output = self
            .command(parts)
            .await?
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExecutorError::SpawnFailed(format!("{}: {e}", parts.program)))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Remote stderr");
        }

        Ok(ExecOutput::new(
            classify_exit(output.status.code()),
            Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        )
        .with_errors(stderr))
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, host: &str, command: &RemoteCommand) -> Result<ExecOutput, ExecutorError> {
        let parts = self.build_invocation(host, command)?;
        tracing::debug!(host, line = %command.line, mode = ?command.mode, "Running remote command");

        let result = match command.mode {
            ExecMode::Interactive => self.run_interactive(&parts).await,
            ExecMode::Captured => self.run_captured(&parts).await,
        };

        match &result {
            Ok(out) => tracing::debug!(host, status = ?out.status, "Remote command finished"),
            Err(e) => tracing::warn!(host, "Remote command could not run: {e}"),
        }
        result
    }
}

/// Classify a local ssh exit code.
///
/// ssh exits 255 on its own errors (unreachable host, failed auth), but a
/// remote command exiting 255 is indistinguishable, so that code is only
/// ever reported as suspect. No code at all means ssh died from a signal.
#[must_use]
pub const fn classify_exit(code: Option<i32>) -> ExecStatus {
    match code {
        Some(SSH_FAILURE_CODE) => ExecStatus::TransportSuspect(Some(SSH_FAILURE_CODE)),
        Some(COMMAND_NOT_FOUND_CODE) => ExecStatus::CommandNotFound,
        Some(code) => ExecStatus::Exited(code),
        None => ExecStatus::TransportSuspect(None),
    }
}

/// Last `limit` bytes of a byte stream.
struct OutputTail {
    buf: Vec<u8>,
    limit: usize,
}

impl OutputTail {
    fn new(limit: usize) -> Self {
        Self {
            buf: Vec::with_capacity(limit),
            limit,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > self.limit {
            let excess = self.buf.len() - self.limit;
            self.buf.drain(..excess);
        }
    }

    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}
