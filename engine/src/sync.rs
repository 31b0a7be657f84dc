//! Periodic refresh loop driving the quote engine.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::QuoteEngine;
use crate::error::{QuoteError, QuoteResult};
use crate::provider::RateProvider;

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between refresh ticks.
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Lifecycle state of the synchronizer. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
    Stopped,
}

/// Drives periodic recomputation of the engine's tables.
///
/// One tick per interval: pull a snapshot from the provider, hand it to the
/// engine. A transient provider failure skips the tick and the last published
/// tables keep serving; an unregistered-pair failure stops the loop and
/// surfaces the error. Cancellation is cooperative and takes effect at the
/// next tick boundary; a recompute in flight is never interrupted.
pub struct Synchronizer {
    engine: Arc<QuoteEngine>,
    provider: Arc<dyn RateProvider>,
    config: SyncConfig,
    state: RwLock<SyncState>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl Synchronizer {
    /// Create a new synchronizer with default configuration.
    pub fn new(engine: Arc<QuoteEngine>, provider: Arc<dyn RateProvider>) -> Self {
        Self::with_config(engine, provider, SyncConfig::default())
    }

    /// Create a new synchronizer with custom configuration.
    pub fn with_config(
        engine: Arc<QuoteEngine>,
        provider: Arc<dyn RateProvider>,
        config: SyncConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            engine,
            provider,
            config,
            state: RwLock::new(SyncState::Idle),
            shutdown_tx,
            shutdown_rx: Mutex::new(Some(shutdown_rx)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// The engine this synchronizer feeds.
    pub fn engine(&self) -> &Arc<QuoteEngine> {
        &self.engine
    }

    /// Run the refresh loop until stopped.
    ///
    /// Returns `Ok(())` after an explicit `stop`, or the provider error when
    /// the provider reports an unregistered pair. Calling `run` a second time
    /// fails with `AlreadyRunning`.
    pub async fn run(&self) -> QuoteResult<()> {
        let mut shutdown_rx = self
            .shutdown_rx
            .lock()
            .take()
            .ok_or(QuoteError::AlreadyRunning)?;

        *self.state.write() = SyncState::Running;
        info!(
            provider = self.provider.name(),
            interval_ms = self.config.interval.as_millis() as u64,
            "Synchronization started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    *self.state.write() = SyncState::Stopped;
                    info!("Synchronization stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.interval) => {
                    match self.provider.get_rates().await {
                        Ok(snapshot) => self.engine.recompute(snapshot),
                        Err(e) if e.is_fatal() => {
                            *self.state.write() = SyncState::Stopped;
                            error!(error = %e, "Synchronization aborted");
                            return Err(e);
                        }
                        Err(e) => {
                            warn!(error = %e, "Rate refresh failed, skipping tick");
                        }
                    }
                }
            }
        }
    }

    /// Request the loop to stop at the next tick boundary.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
