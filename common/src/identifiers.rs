//! Identifier types for DexQuote entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Symbol of a tradeable asset (e.g. an ERC-20 token ticker).
///
/// Symbols are opaque: no case folding or other normalization is applied,
/// two assets compare equal only if their symbols are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new asset ID.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An ordered pair of assets, read as "convert `from` into `to`".
///
/// Pairs are plain value keys; the pair itself carries no rate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    /// Asset being converted out of.
    pub from: AssetId,
    /// Asset being converted into.
    pub to: AssetId,
}

impl AssetPair {
    /// Create a new directed pair.
    pub fn new(from: impl Into<AssetId>, to: impl Into<AssetId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Get the pair in the opposite direction.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    /// Whether both endpoints are the same asset.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// Identifier of one published table generation.
/// Uses UUID v7 for time-ordered identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotVersion(Uuid);

impl SnapshotVersion {
    /// Create a new snapshot version.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SnapshotVersion {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
