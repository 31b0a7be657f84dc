//! Main quote engine implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dexquote_common::{AssetPair, SnapshotVersion};
use parking_lot::RwLock;
use tracing::{info, instrument};

use crate::error::{QuoteError, QuoteResult};
use crate::graph::RateGraph;
use crate::quote::Quote;
use crate::snapshot::RateSnapshot;

/// Configuration for the quote engine.
#[derive(Debug, Clone)]
pub struct QuoteEngineConfig {
    /// Number of relaxation rounds per recompute. Bounds both runtime and
    /// path length; higher values find longer routes at higher cost.
    pub relaxation_rounds: usize,
    /// Minimum log-rate improvement required to replace an existing quote.
    pub tolerance: f64,
}

impl Default for QuoteEngineConfig {
    fn default() -> Self {
        Self {
            relaxation_rounds: 3,
            tolerance: 1e-10,
        }
    }
}

/// One published table generation. Both tables always derive from the same
/// snapshot; the generation is immutable once built.
#[derive(Debug)]
struct RateTables {
    version: SnapshotVersion,
    computed_at: DateTime<Utc>,
    rates: HashMap<AssetPair, f64>,
    quotes: HashMap<AssetPair, Quote>,
}

impl RateTables {
    fn empty() -> Self {
        Self {
            version: SnapshotVersion::new(),
            computed_at: Utc::now(),
            rates: HashMap::new(),
            quotes: HashMap::new(),
        }
    }
}

/// The quote engine: owns the current direct-rate and best-quote tables and
/// serves point queries against them.
///
/// `recompute` builds a complete new generation and swaps it in under the
/// write lock, so concurrent readers always observe a rate table and a quote
/// table from the same snapshot. Readers hold the lock only long enough to
/// clone the generation handle.
pub struct QuoteEngine {
    config: QuoteEngineConfig,
    tables: RwLock<Arc<RateTables>>,
}

impl QuoteEngine {
    /// Create a new engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(QuoteEngineConfig::default())
    }

    /// Create a new engine with custom configuration.
    pub fn with_config(config: QuoteEngineConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(Arc::new(RateTables::empty())),
        }
    }

    /// Rebuild both tables from a fresh snapshot and publish them atomically.
    ///
    /// Non-positive rates are dropped (and logged) before the graph is built;
    /// an empty snapshot publishes empty tables. The previous generation is
    /// fully replaced, never patched.
    #[instrument(skip(self, snapshot), fields(pairs = snapshot.len()))]
    pub fn recompute(&self, snapshot: RateSnapshot) {
        let rates = snapshot.filter_positive();
        let graph = RateGraph::from_rates(&rates);
        let quotes = graph.best_quotes(self.config.relaxation_rounds, self.config.tolerance);

        let tables = Arc::new(RateTables {
            version: SnapshotVersion::new(),
            computed_at: Utc::now(),
            rates,
            quotes,
        });

        info!(
            version = %tables.version,
            rates = tables.rates.len(),
            quotes = tables.quotes.len(),
            "Published rate tables"
        );

        *self.tables.write() = tables;
    }

    /// Get the direct rate published for exactly this pair.
    ///
    /// Consults only the direct-rate table; a pair absent from (or filtered
    /// out of) the last snapshot is not found even if a quote exists for it.
    pub fn get_rate(&self, pair: &AssetPair) -> QuoteResult<f64> {
        self.current()
            .rates
            .get(pair)
            .copied()
            .ok_or_else(|| QuoteError::RateNotFound(pair.clone()))
    }

    /// Get the best known quote for this pair.
    pub fn get_quote(&self, pair: &AssetPair) -> QuoteResult<Quote> {
        self.current()
            .quotes
            .get(pair)
            .cloned()
            .ok_or_else(|| QuoteError::QuoteNotFound(pair.clone()))
    }

    /// Get engine statistics for the current generation.
    pub fn stats(&self) -> EngineStats {
        let tables = self.current();

        EngineStats {
            version: tables.version,
            computed_at: tables.computed_at,
            rate_count: tables.rates.len(),
            quote_count: tables.quotes.len(),
        }
    }

    fn current(&self) -> Arc<RateTables> {
        Arc::clone(&self.tables.read())
    }
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics.
#[derive(Debug, Clone)]
pub struct EngineStats {
    /// Version of the published generation.
    pub version: SnapshotVersion,
    /// When the generation was computed.
    pub computed_at: DateTime<Utc>,
    /// Entries in the direct-rate table.
    pub rate_count: usize,
    /// Entries in the quote table.
    pub quote_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexquote_common::AssetId;
    use proptest::prelude::*;

    fn snapshot(entries: &[(&str, &str, f64)]) -> RateSnapshot {
        entries
            .iter()
            .map(|(from, to, rate)| (AssetPair::new(*from, *to), *rate))
            .collect()
    }

    fn path(assets: &[&str]) -> Vec<AssetId> {
        assets.iter().map(|a| AssetId::new(*a)).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_queries_before_first_recompute_return_not_found() {
        let engine = QuoteEngine::new();
        let pair = AssetPair::new("ETH", "USDC");

        assert!(matches!(
            engine.get_rate(&pair),
            Err(QuoteError::RateNotFound(_))
        ));
        assert!(matches!(
            engine.get_quote(&pair),
            Err(QuoteError::QuoteNotFound(_))
        ));
    }

    #[test]
    fn test_get_rate_serves_the_snapshot_verbatim() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("ETH", "USDC", 2000.0), ("ETH", "DAI", 1995.0)]));

        assert_eq!(engine.get_rate(&AssetPair::new("ETH", "USDC")).unwrap(), 2000.0);
        assert_eq!(engine.get_rate(&AssetPair::new("ETH", "DAI")).unwrap(), 1995.0);
        // The implied reverse rate is a quote-table concern only.
        assert!(engine.get_rate(&AssetPair::new("USDC", "ETH")).is_err());
    }

    #[test]
    fn test_non_positive_rates_reach_neither_table() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("ETH", "USDC", -3.0), ("DAI", "USDC", 1.0)]));

        let dropped = AssetPair::new("ETH", "USDC");
        assert!(engine.get_rate(&dropped).is_err());
        assert!(engine.get_quote(&dropped).is_err());
        // ETH touches no edge, so not even its identity quote exists.
        assert!(engine.get_quote(&AssetPair::new("ETH", "ETH")).is_err());
    }

    #[test]
    fn test_identity_quote() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("ETH", "USDC", 2000.0)]));

        for asset in ["ETH", "USDC"] {
            let quote = engine.get_quote(&AssetPair::new(asset, asset)).unwrap();
            assert_eq!(quote.path, path(&[asset]));
            assert!(approx(quote.rate, 1.0));
        }
    }

    #[test]
    fn test_inverse_consistency() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("ETH", "USDC", 2000.0)]));

        let quote = engine.get_quote(&AssetPair::new("USDC", "ETH")).unwrap();
        assert_eq!(quote.path, path(&["USDC", "ETH"]));
        assert!(approx(quote.rate, 1.0 / 2000.0));
    }

    #[test]
    fn test_bounded_hop_optimality() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0), ("B", "C", 3.0)]));

        let quote = engine.get_quote(&AssetPair::new("A", "C")).unwrap();
        assert_eq!(quote.path, path(&["A", "B", "C"]));
        assert!(approx(quote.rate, 6.0));
    }

    #[test]
    fn test_best_of_multiple_paths() {
        // Indirect A->C->B converts at 3, beating the direct A->B edge at 2.
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0), ("A", "C", 1.0), ("C", "B", 3.0)]));

        let quote = engine.get_quote(&AssetPair::new("A", "B")).unwrap();
        assert_eq!(quote.path, path(&["A", "C", "B"]));
        assert!(approx(quote.rate, 3.0));
    }

    #[test]
    fn test_tie_keeps_first_discovered_path() {
        // A->C->B also converts at 2; the direct edge was found first and an
        // equal candidate must not displace it.
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0), ("A", "C", 2.0), ("C", "B", 1.0)]));

        let quote = engine.get_quote(&AssetPair::new("A", "B")).unwrap();
        assert_eq!(quote.path, path(&["A", "B"]));
        assert!(approx(quote.rate, 2.0));
    }

    #[test]
    fn test_recompute_replaces_wholesale() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0)]));
        let first = engine.stats();

        engine.recompute(snapshot(&[("A", "C", 5.0)]));
        let second = engine.stats();

        assert_ne!(first.version, second.version);
        // Nothing from the first snapshot survives in either table.
        assert!(engine.get_rate(&AssetPair::new("A", "B")).is_err());
        assert!(engine.get_quote(&AssetPair::new("A", "B")).is_err());
        assert_eq!(engine.get_rate(&AssetPair::new("A", "C")).unwrap(), 5.0);
        assert!(engine.get_quote(&AssetPair::new("C", "A")).is_ok());
    }

    #[test]
    fn test_empty_snapshot_publishes_empty_tables() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0)]));
        engine.recompute(RateSnapshot::new());

        let stats = engine.stats();
        assert_eq!(stats.rate_count, 0);
        assert_eq!(stats.quote_count, 0);
    }

    #[test]
    fn test_self_pair_does_not_crash() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "A", 2.0), ("A", "B", 3.0)]));

        assert_eq!(engine.get_rate(&AssetPair::new("A", "A")).unwrap(), 2.0);
        assert!(engine.get_quote(&AssetPair::new("A", "B")).is_ok());
    }

    #[test]
    fn test_stats_counts() {
        let engine = QuoteEngine::new();
        engine.recompute(snapshot(&[("A", "B", 2.0), ("B", "C", 3.0)]));

        let stats = engine.stats();
        assert_eq!(stats.rate_count, 2);
        // Identities (3) + every ordered pair of {A, B, C} (6).
        assert_eq!(stats.quote_count, 9);
    }

    proptest! {
        #[test]
        fn prop_inverse_rate_is_reciprocal(rate in 1e-6f64..1e6) {
            let engine = QuoteEngine::new();
            engine.recompute(snapshot(&[("ETH", "USDC", rate)]));

            let quote = engine.get_quote(&AssetPair::new("USDC", "ETH")).unwrap();
            let expected = 1.0 / rate;
            prop_assert!((quote.rate - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_non_positive_rates_are_filtered(rate in -1e6f64..=0.0) {
            let engine = QuoteEngine::new();
            engine.recompute(snapshot(&[("ETH", "USDC", rate)]));

            let pair = AssetPair::new("ETH", "USDC");
            prop_assert!(engine.get_rate(&pair).is_err());
            prop_assert!(engine.get_quote(&pair).is_err());
        }
    }
}
