//! Identifier handed out for every uploaded ABI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Registry key for a stored ABI.
///
/// Random (v4) UUID, rendered in the 36-character lowercase hyphenated form.
/// Only that exact form names a stored ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbiId(Uuid);

/// String that is not a canonical ABI id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ABI id: {0:?}")]
pub struct InvalidAbiId(String);

impl AbiId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the canonical lowercase hyphenated form
    pub fn parse(s: &str) -> Result<Self, InvalidAbiId> {
        match Uuid::parse_str(s) {
            Ok(uuid) if uuid.hyphenated().to_string() == s => Ok(Self(uuid)),
            _ => Err(InvalidAbiId(s.to_string())),
        }
    }
}

impl Default for AbiId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AbiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AbiId {
    type Err = InvalidAbiId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for AbiId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
