//! Transient log-space rate graph and the bounded best-quote search.

use std::collections::HashMap;

use dexquote_common::{AssetId, AssetPair};
use tracing::debug;

use crate::quote::Quote;

/// Outgoing edge of the rate graph. `weight` is the natural logarithm of the
/// direct rate, so path products become sums.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Destination asset.
    pub to: AssetId,
    /// Signed log-rate of the hop.
    pub weight: f64,
}

/// Adjacency view of one rate snapshot.
///
/// Every direct rate contributes two edges: the registered direction at
/// `+ln(rate)` and the implied reverse direction at `-ln(rate)`. The graph is
/// rebuilt from scratch on every recompute and discarded afterwards; only the
/// tables derived from it persist.
#[derive(Debug, Default)]
pub struct RateGraph {
    adjacency: HashMap<AssetId, Vec<Edge>>,
}

/// A quote still in log space, used only during relaxation.
#[derive(Debug, Clone)]
struct LogQuote {
    path: Vec<AssetId>,
    log_rate: f64,
}

impl LogQuote {
    /// An extension may revisit the start asset (closing a cycle) but no
    /// other asset already on the path.
    fn would_revisit(&self, next: &AssetId) -> bool {
        self.path[1..].contains(next)
    }
}

impl RateGraph {
    /// Build the graph from an already-filtered map of positive direct rates.
    pub fn from_rates(rates: &HashMap<AssetPair, f64>) -> Self {
        let mut adjacency: HashMap<AssetId, Vec<Edge>> = HashMap::new();

        for (pair, rate) in rates {
            let weight = rate.ln();
            adjacency.entry(pair.from.clone()).or_default().push(Edge {
                to: pair.to.clone(),
                weight,
            });
            adjacency.entry(pair.to.clone()).or_default().push(Edge {
                to: pair.from.clone(),
                weight: -weight,
            });
        }

        // Canonical edge order: destination, then stronger edge first. Ties
        // between equally good paths then resolve the same way on every run.
        for edges in adjacency.values_mut() {
            edges.sort_by(|a, b| {
                a.to.cmp(&b.to).then_with(|| {
                    b.weight
                        .partial_cmp(&a.weight)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            });
        }

        debug!(assets = adjacency.len(), pairs = rates.len(), "Built rate graph");

        Self { adjacency }
    }

    /// Outgoing edges of an asset.
    pub fn edges_from(&self, asset: &AssetId) -> &[Edge] {
        self.adjacency.get(asset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of assets touching at least one edge.
    pub fn asset_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no edges at all.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Run the bounded multi-source relaxation and return the best quote per
    /// reachable pair.
    ///
    /// Every edge endpoint is seeded with its identity quote, then each round
    /// extends every known quote by one hop, so a published path spans at
    /// most `rounds` hops. A candidate only replaces an incumbent when it is
    /// better by more than `tolerance`; on ties the first discovered path
    /// wins. Positive cycles are capped by the round limit rather than
    /// chased to convergence.
    pub fn best_quotes(&self, rounds: usize, tolerance: f64) -> HashMap<AssetPair, Quote> {
        let mut quotes: HashMap<AssetPair, LogQuote> = HashMap::new();

        for asset in self.adjacency.keys() {
            quotes.insert(
                AssetPair::new(asset.clone(), asset.clone()),
                LogQuote {
                    path: vec![asset.clone()],
                    log_rate: 0.0,
                },
            );
        }

        for _ in 0..rounds {
            // Extend a sorted snapshot of the quote set taken at round start;
            // improvements become sources in the next round.
            let mut frontier: Vec<(AssetPair, LogQuote)> = quotes
                .iter()
                .map(|(pair, quote)| (pair.clone(), quote.clone()))
                .collect();
            frontier.sort_by(|a, b| a.0.cmp(&b.0));

            for (pair, quote) in frontier {
                for edge in self.edges_from(&pair.to) {
                    if quote.would_revisit(&edge.to) {
                        continue;
                    }

                    let candidate = quote.log_rate + edge.weight;
                    let key = AssetPair::new(pair.from.clone(), edge.to.clone());

                    let improves = match quotes.get(&key) {
                        Some(existing) => candidate > existing.log_rate + tolerance,
                        None => true,
                    };

                    if improves {
                        let mut path = quote.path.clone();
                        path.push(edge.to.clone());
                        quotes.insert(
                            key,
                            LogQuote {
                                path,
                                log_rate: candidate,
                            },
                        );
                    }
                }
            }
        }

        quotes
            .into_iter()
            .map(|(pair, quote)| {
                (
                    pair,
                    Quote {
                        path: quote.path,
                        rate: quote.log_rate.exp(),
                    },
                )
            })
            .collect()
    }
}
