//! ssh remote execution and tmux adapter for remote sessions.
//!
//! Provides:
//! - `SshExecutor` - `RemoteExecutor` over the `ssh` client
//! - Command building and remote shell escaping
//! - `TmuxAdapter` - `Multiplexer` for tmux

pub mod command;
pub mod resolve;
pub mod ssh;
pub mod tmux;

pub use command::{CommandBuildError, CommandBuilder, CommandParts, escape_double_quoted};
pub use resolve::resolve_executable_path;
pub use ssh::{SshExecutor, SshOptions};
pub use tmux::TmuxAdapter;
