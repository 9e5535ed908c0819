//! Configuration loading and validation.
//!
//! The file lives at `~/.config/remote-sessions/config.toml`. Every field
//! has a default, so a missing or partial file is fine.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use remote_sessions_core::{HostSet, find_illegal_chars};
use remote_sessions_executor::SshOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Environment variable holding a comma separated host list.
pub const HOSTS_ENV: &str = "REMOTE_SESSIONS_HOSTS";

/// Environment variable overriding `log_level`.
pub const LOG_LEVEL_ENV: &str = "REMOTE_SESSIONS_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No hosts configured")]
    NoHosts,

    #[error("Invalid host name: {0:?}")]
    InvalidHost(String),

    #[error("Host listed more than once: {0}")]
    DuplicateHost(String),

    #[error("Invalid log level: {0} (expected one of trace, debug, info, warn, error, off)")]
    InvalidLogLevel(String),

    #[error("Multiplexer program must not be empty")]
    EmptyMultiplexerProgram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosts sessions may live on.
    pub hosts: Vec<String>,

    /// Where the registry is persisted.
    pub state_file: PathBuf,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub ssh: SshOptions,

    pub multiplexer: MultiplexerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplexerConfig {
    /// Multiplexer binary on the remote hosts.
    pub program: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost".to_string()],
            state_file: default_state_file(),
            log_level: "warn".to_string(),
            ssh: SshOptions::default(),
            multiplexer: MultiplexerConfig::default(),
        }
    }
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            program: "tmux".to_string(),
        }
    }
}

/// Default configuration file location.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("remote-sessions")
        .join("config.toml")
}

fn default_state_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".remote-sessions.json")
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the string is not a valid configuration.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", e.message()))
    }

    /// Apply `REMOTE_SESSIONS_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(hosts) = lookup(HOSTS_ENV) {
            let hosts: Vec<String> = hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
            if !hosts.is_empty() {
                tracing::info!(?hosts, "Overriding hosts from environment");
                self.hosts = hosts;
            }
        }

        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|l| !l.is_empty()) {
            tracing::info!(%level, "Overriding log_level from environment");
            self.log_level = level;
        }
    }

    /// Check every value.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::NoHosts);
        }

        let mut seen = HashSet::new();
        for host in &self.hosts {
            if !is_valid_host(host) {
                return Err(ConfigError::InvalidHost(host.clone()));
            }
            if !seen.insert(host.as_str()) {
                return Err(ConfigError::DuplicateHost(host.clone()));
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.multiplexer.program.trim().is_empty() {
            return Err(ConfigError::EmptyMultiplexerProgram);
        }

        Ok(())
    }

    /// The configured hosts, in order.
    #[must_use]
    pub fn host_set(&self) -> HostSet {
        HostSet::new(&self.hosts)
    }
}

// A host goes straight onto the ssh command line: no whitespace, no
// leading '-' that ssh would read as an option.
fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && !host.starts_with('-')
        && !host.chars().any(char::is_whitespace)
        && find_illegal_chars(host).is_empty()
}
