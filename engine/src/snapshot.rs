//! Rate snapshots as delivered by a provider.

use std::collections::HashMap;

use dexquote_common::AssetPair;
use tracing::warn;

/// One complete set of direct rates, ingested together.
///
/// A snapshot always replaces the previous one wholesale; snapshots are never
/// merged across ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSnapshot {
    rates: HashMap<AssetPair, f64>,
}

impl RateSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direct rate for a pair, replacing any previous value.
    pub fn insert(&mut self, pair: AssetPair, rate: f64) {
        self.rates.insert(pair, rate);
    }

    /// Get the direct rate for a pair, if present.
    pub fn get(&self, pair: &AssetPair) -> Option<f64> {
        self.rates.get(pair).copied()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&AssetPair, f64)> {
        self.rates.iter().map(|(pair, rate)| (pair, *rate))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Drop every entry whose rate is not a strictly positive finite number.
    ///
    /// A non-positive rate carries no conversion information and has no
    /// logarithm; each drop is logged, never surfaced as an error.
    pub fn filter_positive(self) -> HashMap<AssetPair, f64> {
        let mut retained = HashMap::with_capacity(self.rates.len());

        for (pair, rate) in self.rates {
            if rate > 0.0 && rate.is_finite() {
                retained.insert(pair, rate);
            } else {
                warn!(pair = %pair, rate, "Dropping non-positive rate");
            }
        }

        retained
    }
}

impl FromIterator<(AssetPair, f64)> for RateSnapshot {
    fn from_iter<I: IntoIterator<Item = (AssetPair, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<AssetPair, f64>> for RateSnapshot {
    fn from(rates: HashMap<AssetPair, f64>) -> Self {
        Self { rates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut snapshot = RateSnapshot::new();
        let pair = AssetPair::new("ETH", "USDC");

        snapshot.insert(pair.clone(), 1800.0);
        snapshot.insert(pair.clone(), 1900.0);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&pair), Some(1900.0));
    }

    #[test]
    fn test_filter_drops_non_positive_and_non_finite() {
        let snapshot: RateSnapshot = [
            (AssetPair::new("ETH", "USDC"), 1800.0),
            (AssetPair::new("ETH", "DAI"), 0.0),
            (AssetPair::new("DAI", "USDC"), -1.0),
            (AssetPair::new("WBTC", "ETH"), f64::NAN),
            (AssetPair::new("WBTC", "DAI"), f64::INFINITY),
        ]
        .into_iter()
        .collect();

        let retained = snapshot.filter_positive();

        assert_eq!(retained.len(), 1);
        assert_eq!(retained.get(&AssetPair::new("ETH", "USDC")), Some(&1800.0));
    }

    #[test]
    fn test_empty_snapshot_filters_to_empty() {
        assert!(RateSnapshot::new().filter_positive().is_empty());
    }
}
