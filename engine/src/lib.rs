//! DexQuote Rate Graph Engine
//!
//! Maintains live exchange rates between tradeable assets and answers two
//! queries: the direct rate for a pair, and the best multi-hop conversion
//! (with its path) routed through other assets.
//!
//! # Features
//!
//! - Log-space rate graph with implied reverse edges
//! - Bounded multi-source relaxation for best-rate paths
//! - Atomic table publication under a single-writer/multi-reader lock
//! - Periodic refresh loop with cooperative cancellation
//! - Multiple rate provider support with aggregation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dexquote_common::AssetPair;
//! use dexquote_engine::{QuoteEngine, Synchronizer};
//!
//! let engine = Arc::new(QuoteEngine::new());
//! let sync = Arc::new(Synchronizer::new(engine.clone(), provider));
//! tokio::spawn({
//!     let sync = sync.clone();
//!     async move { sync.run().await }
//! });
//!
//! let quote = engine.get_quote(&AssetPair::new("ETH", "DAI"))?;
//! println!("best route: {quote}");
//! ```

pub mod engine;
pub mod provider;
pub mod snapshot;
pub mod graph;
pub mod quote;
pub mod sync;
pub mod error;

pub use engine::{EngineStats, QuoteEngine, QuoteEngineConfig};
pub use provider::{AggregatedRateProvider, RateProvider};
pub use quote::Quote;
pub use snapshot::RateSnapshot;
pub use sync::{SyncConfig, SyncState, Synchronizer};
pub use error::{QuoteError, QuoteResult};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
