//! Engine error types.

use dexquote_common::AssetPair;
use thiserror::Error;

/// Errors that can occur in the quote engine and refresh loop.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// No direct rate published for the requested pair.
    #[error("No rate published for {0}")]
    RateNotFound(AssetPair),

    /// No quote reachable for the requested pair.
    #[error("No quote reachable for {0}")]
    QuoteNotFound(AssetPair),

    /// The provider does not know the pair at all. This is a configuration
    /// error, fatal to the refresh loop.
    #[error("Pair not registered with provider: {0}")]
    PairNotRegistered(AssetPair),

    /// Provider returned a transient error; the tick is skipped.
    #[error("Rate provider error: {0}")]
    Provider(String),

    /// The synchronizer was started a second time.
    #[error("Synchronizer already running")]
    AlreadyRunning,
}

impl QuoteError {
    /// Whether this error must stop the refresh loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuoteError::PairNotRegistered(_))
    }
}

/// Result type for engine operations.
pub type QuoteResult<T> = Result<T, QuoteError>;
