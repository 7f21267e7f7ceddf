//! Identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier issued by one of the remote services.
///
/// The services hand out integers, but nothing here depends on that, so
/// textual identifiers are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    /// Integer identifier, serialised back as a JSON number.
    Numeric(u64),

    /// Any other identifier, serialised back as a JSON string.
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Numeric(id) => write!(f, "{id}"),
            RemoteId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for RemoteId {
    fn from(id: u64) -> Self {
        RemoteId::Numeric(id)
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        id.parse::<u64>()
            .map_or_else(|_| RemoteId::Text(id.to_string()), RemoteId::Numeric)
    }
}

/// Product identifier, stable across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(RemoteId);

impl ProductId {
    /// Wraps a remote identifier.
    pub fn new(id: impl Into<RemoteId>) -> Self {
        Self(id.into())
    }

    /// Wraps an integer identifier.
    pub fn numeric(id: u64) -> Self {
        Self(RemoteId::Numeric(id))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Order identifier returned by a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(RemoteId);

impl OrderId {
    /// Wraps a remote identifier.
    pub fn new(id: impl Into<RemoteId>) -> Self {
        Self(id.into())
    }

    /// Wraps an integer identifier.
    pub fn numeric(id: u64) -> Self {
        Self(RemoteId::Numeric(id))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User identifier issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
