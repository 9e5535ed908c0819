//! Core abstractions for remote multiplexer session management.
//!
//! This crate provides the fundamental building blocks:
//! - `SessionName` - Validated session names, safe to embed in remote commands
//! - `HostSet` - The configured candidate hosts
//! - `Intent` - The closed set of user actions
//! - `Outcome` - Interpreted result of one multiplexer invocation
//! - Executor, multiplexer and registry storage traits

pub mod host;
pub mod intent;
pub mod name;
pub mod outcome;
pub mod traits;

pub use host::{HostError, HostFilter, HostSet};
pub use intent::{Intent, KillTarget};
pub use name::{NameError, SessionName, find_illegal_chars};
pub use outcome::{ExecOutput, ExecStatus, Outcome};
pub use traits::{
    ExecMode, ExecutorError, Listing, Multiplexer, MultiplexerError, RegistryStore,
    RemoteCommand, RemoteExecutor, SessionEntry, StorageError,
};
