//! Results of engine actions.

use remote_sessions_core::{Outcome, SessionEntry, SessionName};

use crate::EngineError;

/// What an intent did.
#[derive(Debug)]
pub enum ActionReport {
    /// Registry contents, most recently used first.
    Listing {
        entries: Vec<SessionEntry>,
        show_hosts: bool,
    },
    Created {
        name: SessionName,
        host: String,
    },
    /// Attach returned normally; `removed` when the session ended.
    Attached {
        name: SessionName,
        host: String,
        outcome: Outcome,
        removed: bool,
    },
    Killed {
        name: SessionName,
        host: String,
        outcome: Outcome,
    },
    /// Result of killing every session; failures did not stop the rest.
    KilledAll {
        killed: Vec<SessionEntry>,
        failed: Vec<(SessionName, EngineError)>,
    },
    Renamed {
        old: SessionName,
        new: SessionName,
        host: String,
    },
    /// One entry per visited host, in visiting order.
    Refreshed(Vec<HostRefresh>),
}

/// Refresh result for a single host.
#[derive(Debug)]
pub struct HostRefresh {
    pub host: String,
    /// Entries dropped before listing.
    pub cleared: Vec<SessionName>,
    pub result: RefreshResult,
}

/// What listing a host produced.
#[derive(Debug)]
pub enum RefreshResult {
    /// Sessions now registered to the host, in listing order.
    Found(Vec<SessionName>),
    /// The multiplexer reported nothing running.
    NoSessions,
    /// The listing failed; the host is left with no entries.
    Unavailable(EngineError),
}

impl HostRefresh {
    /// Sessions discovered on the host.
    #[must_use]
    pub fn found(&self) -> &[SessionName] {
        match &self.result {
            RefreshResult::Found(names) => names,
            RefreshResult::NoSessions | RefreshResult::Unavailable(_) => &[],
        }
    }
}
