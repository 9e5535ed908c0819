//! rsm - manage tmux sessions on remote hosts over ssh.

use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use remote_sessions_executor::{SshExecutor, TmuxAdapter};
use remote_sessions_registry::{ReconciliationEngine, storage::JsonFileStore};
use remote_sessions_shell::{Config, SessionShell, default_config_path, logging};

/// Manage tmux sessions on remote hosts.
#[derive(Parser, Debug)]
#[command(name = "rsm")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host to manage sessions on (repeatable, replaces configured hosts)
    #[arg(long = "host", value_name = "HOST")]
    hosts: Vec<String>,

    /// Where the session registry is stored
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Run one shell command and exit instead of starting the shell
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logs = logging::init()?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides();
    if !cli.hosts.is_empty() {
        config.hosts.clone_from(&cli.hosts);
    }
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }
    config.validate().context("Invalid configuration")?;
    logs.apply_level(&config.log_level)?;

    tracing::debug!(config = %config_path.display(), hosts = ?config.hosts, "Starting");

    let engine = ReconciliationEngine::new(
        SshExecutor::new(config.ssh.clone()),
        TmuxAdapter::new(config.multiplexer.program.clone()),
        config.host_set(),
    );
    let store = JsonFileStore::new(&config.state_file);
    let mut shell = SessionShell::open(engine, Box::new(store))
        .await
        .with_context(|| format!("Failed to load sessions from {}", config.state_file.display()))?;

    // Blocking stdin: the ssh child shares the terminal and must see every
    // keystroke once it is running.
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    if cli.command.is_empty() {
        shell.run(&mut input, &mut out).await?;
    } else {
        shell
            .run_line(&cli.command.join(" "), &mut input, &mut out)
            .await?;
    }
    Ok(())
}
