//! User intents.

use crate::{HostFilter, SessionName};

/// Target of a kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillTarget {
    /// A single registered session.
    Named(SessionName),
    /// Every registered session, one at a time.
    All,
}

/// The closed set of actions the reconciliation engine performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Enumerate the registry, most recently used first. No remote call.
    List { show_hosts: bool },
    /// Create a session on `host`, or on a random configured host.
    Create {
        name: SessionName,
        host: Option<String>,
    },
    /// Attach to a registered session.
    Attach { name: SessionName },
    /// Kill one or all registered sessions.
    Kill(KillTarget),
    /// Rename a registered session.
    Rename { old: SessionName, new: SessionName },
    /// Rebuild registry entries from the hosts' own listings.
    Refresh(HostFilter),
}

impl Intent {
    /// Short verb used in logs and reports.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Create { .. } => "new",
            Self::Attach { .. } => "attach",
            Self::Kill(_) => "kill",
            Self::Rename { .. } => "rename",
            Self::Refresh(_) => "refresh",
        }
    }
}
