//! Interactive shell for tmux sessions spread across remote hosts.
//!
//! Provides:
//! - `Config` - TOML configuration with environment overrides
//! - `parse_line` - Shell command parsing and name validation
//! - `SessionShell` - The read-eval-print loop around the reconciliation engine
//! - `logging` - stderr log setup that follows the configured level

pub mod command;
pub mod config;
pub mod logging;
pub mod shell;

pub use command::{HELP, ParseError, ShellCommand, parse_line};
pub use config::{Config, ConfigError, MultiplexerConfig, default_config_path};
pub use shell::{Flow, PROMPT, SessionShell};
