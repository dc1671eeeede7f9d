use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::fragment::error::{FragmentError, Result};

/// Unique identifier for a Fragment
///
/// Freshly created fragments get a UUID v7 (time ordered), but any non-empty
/// string read back from storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FragmentId(String);

impl FragmentId {
    /// Generate a new unique FragmentId
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier, rejecting empty strings
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FragmentError::validation("fragment id must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FragmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FragmentId {
    type Error = FragmentError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<FragmentId> for String {
    fn from(id: FragmentId) -> Self {
        id.0
    }
}

impl From<Uuid> for FragmentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

/// Opaque identifier of the principal owning a fragment
///
/// Produced by the authentication layer; the core only requires it to be
/// non-empty and uses it as half of every storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FragmentError::validation("ownerId is required"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = FragmentError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}
