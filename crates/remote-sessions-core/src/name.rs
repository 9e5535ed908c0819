//! Session names.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters that would let a name break out of the remote shell invocation.
pub const ILLEGAL_CHARS: [char; 3] = [';', '|', '*'];

/// Name validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Session name cannot be empty")]
    Empty,
    #[error("Illegal character found: [{}]", join_chars(.0))]
    IllegalCharacters(Vec<char>),
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns every illegal character present in `input`, in `ILLEGAL_CHARS` order.
#[must_use]
pub fn find_illegal_chars(input: &str) -> Vec<char> {
    ILLEGAL_CHARS
        .into_iter()
        .filter(|c| input.contains(*c))
        .collect()
}

/// A validated session name.
///
/// Non-empty, trimmed, and free of `;`, `|` and `*`. Holding one is the
/// proof that the name may be embedded in a remote command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionName(String);

impl SessionName {
    /// Validate a user-supplied name.
    ///
    /// # Errors
    /// Returns error if the name is empty or contains an illegal character.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, NameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        let illegal = find_illegal_chars(trimmed);
        if !illegal.is_empty() {
            return Err(NameError::IllegalCharacters(illegal));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SessionName> for String {
    fn from(name: SessionName) -> Self {
        name.0
    }
}
