//! Conversion quotes produced by the engine.

use dexquote_common::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The best known conversion outcome for a directed pair.
///
/// `path` lists every asset the conversion passes through, starting at the
/// source and ending at the destination; `rate` is the product of the direct
/// rates along consecutive hops. An asset never appears twice in a path,
/// except that the final element may close a cycle back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Assets visited, in order. Always non-empty.
    pub path: Vec<AssetId>,
    /// Effective conversion rate along the path. Always positive.
    pub rate: f64,
}

impl Quote {
    /// The trivial quote converting an asset into itself.
    pub fn identity(asset: AssetId) -> Self {
        Self {
            path: vec![asset],
            rate: 1.0,
        }
    }

    /// Number of hops along the path.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Source asset of the quote.
    pub fn start(&self) -> Option<&AssetId> {
        self.path.first()
    }

    /// Destination asset of the quote.
    pub fn end(&self) -> Option<&AssetId> {
        self.path.last()
    }

    /// Whether this is a trivial single-asset quote.
    pub fn is_identity(&self) -> bool {
        self.path.len() == 1
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, asset) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", asset)?;
        }
        write!(f, " @ {}", self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_quote() {
        let quote = Quote::identity(AssetId::new("ETH"));

        assert!(quote.is_identity());
        assert_eq!(quote.hops(), 0);
        assert_eq!(quote.rate, 1.0);
        assert_eq!(quote.start(), quote.end());
    }

    #[test]
    fn test_display() {
        let quote = Quote {
            path: vec![AssetId::new("ETH"), AssetId::new("USDC"), AssetId::new("DAI")],
            rate: 1800.5,
        };

        assert_eq!(format!("{}", quote), "ETH -> USDC -> DAI @ 1800.5");
    }

    #[test]
    fn test_serde_round_trip() {
        let quote = Quote {
            path: vec![AssetId::new("ETH"), AssetId::new("USDC")],
            rate: 1800.0,
        };

        let json = serde_json::to_string(&quote).unwrap();
        let parsed: Quote = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, quote);
    }
}
