//! Candidate hosts.

use std::fmt;

use thiserror::Error;

/// Host selection error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Unknown host: {0}")]
    Unknown(String),
    #[error("No hosts configured")]
    Empty,
}

/// The configured list of candidate hosts.
///
/// Fixed for the lifetime of a shell; order is preserved so that
/// refresh-all visits hosts in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: Vec<String>,
}

impl HostSet {
    /// Create a host set, dropping blank and repeated entries.
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for host in hosts {
            let host = host.into().trim().to_string();
            if !host.is_empty() && !unique.contains(&host) {
                unique.push(host);
            }
        }
        Self { hosts: unique }
    }

    #[must_use]
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.hosts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hosts selected by a refresh filter, in configuration order.
    ///
    /// # Errors
    /// Returns error if the filter names a host that is not configured.
    pub fn matching(&self, filter: &HostFilter) -> Result<Vec<&str>, HostError> {
        match filter {
            HostFilter::All => Ok(self.hosts.iter().map(String::as_str).collect()),
            HostFilter::Host(host) => self
                .hosts
                .iter()
                .find(|h| *h == host)
                .map(|h| vec![h.as_str()])
                .ok_or_else(|| HostError::Unknown(host.clone())),
        }
    }
}

/// Which hosts a refresh should visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFilter {
    All,
    Host(String),
}

impl HostFilter {
    /// Parse a user argument; blank and `all` select every host.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => Self::All,
            host => Self::Host(host.to_string()),
        }
    }
}

impl fmt::Display for HostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Host(host) => f.write_str(host),
        }
    }
}
