//! Rate provider traits and implementations.

use std::sync::Arc;

use async_trait::async_trait;
use dexquote_common::AssetPair;
use tracing::{debug, warn};

use crate::error::{QuoteError, QuoteResult};
use crate::snapshot::RateSnapshot;

/// Trait for direct-rate providers.
///
/// A provider owns its own pair registration and delivers one complete
/// snapshot per call; the engine never asks for individual rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Pull a fresh snapshot of direct rates for every registered pair.
    async fn get_rates(&self) -> QuoteResult<RateSnapshot>;

    /// Check if this provider has the given pair registered.
    fn supports_pair(&self, pair: &AssetPair) -> bool;

    /// Get all registered pairs.
    fn registered_pairs(&self) -> Vec<AssetPair>;
}

/// Merges snapshots from multiple providers into one.
///
/// Providers are polled in order and earlier providers win conflicting pairs.
/// A transient provider failure only drops that provider from the tick; an
/// unregistered-pair failure propagates, since it signals misconfiguration
/// rather than a flaky source.
pub struct AggregatedRateProvider {
    providers: Vec<Arc<dyn RateProvider>>,
    min_providers: usize,
}

impl AggregatedRateProvider {
    /// Create a new aggregated provider.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self {
            providers,
            min_providers: 1,
        }
    }

    /// Set minimum number of providers required for a valid snapshot.
    pub fn with_min_providers(mut self, min: usize) -> Self {
        self.min_providers = min;
        self
    }
}

#[async_trait]
impl RateProvider for AggregatedRateProvider {
    fn name(&self) -> &str {
        "AGGREGATED"
    }

    async fn get_rates(&self) -> QuoteResult<RateSnapshot> {
        let mut merged = RateSnapshot::new();
        let mut responded = 0usize;

        for provider in &self.providers {
            match provider.get_rates().await {
                Ok(snapshot) => {
                    debug!(
                        provider = provider.name(),
                        pairs = snapshot.len(),
                        "Got snapshot from provider"
                    );
                    for (pair, rate) in snapshot.iter() {
                        if merged.get(pair).is_none() {
                            merged.insert(pair.clone(), rate);
                        }
                    }
                    responded += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed to return snapshot"
                    );
                }
            }
        }

        if responded < self.min_providers {
            return Err(QuoteError::Provider(format!(
                "only {} of {} providers responded (minimum {})",
                responded,
                self.providers.len(),
                self.min_providers
            )));
        }

        Ok(merged)
    }

    fn supports_pair(&self, pair: &AssetPair) -> bool {
        self.providers.iter().any(|p| p.supports_pair(pair))
    }

    fn registered_pairs(&self) -> Vec<AssetPair> {
        let mut pairs: Vec<AssetPair> = self
            .providers
            .iter()
            .flat_map(|p| p.registered_pairs())
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: dashmap::DashMap<AssetPair, f64>,
    next_error: parking_lot::Mutex<Option<QuoteError>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            next_error: parking_lot::Mutex::new(None),
        }
    }

    /// Set the rate for a pair.
    pub fn set_rate(&self, pair: AssetPair, rate: f64) {
        self.rates.insert(pair, rate);
    }

    /// Remove all rates.
    pub fn clear(&self) {
        self.rates.clear();
    }

    /// Make the next `get_rates` call fail with the given error.
    pub fn fail_next(&self, error: QuoteError) {
        *self.next_error.lock() = Some(error);
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_rates(&self) -> QuoteResult<RateSnapshot> {
        if let Some(error) = self.next_error.lock().take() {
            return Err(error);
        }

        Ok(self
            .rates
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect())
    }

    fn supports_pair(&self, pair: &AssetPair) -> bool {
        self.rates.contains_key(pair)
    }

    fn registered_pairs(&self) -> Vec<AssetPair> {
        self.rates.iter().map(|entry| entry.key().clone()).collect()
    }
}
