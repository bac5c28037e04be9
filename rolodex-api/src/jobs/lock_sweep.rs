//! Expired Edit-Lock Sweep
//!
//! Optional background task that clears the lock fields of contacts whose
//! `editingUntil` has passed. Acquisition already ignores expired locks, so
//! the sweep only keeps `isEditing` honest for readers and filters.
//!
//! ```ignore
//! use rolodex_api::jobs::{lock_sweep_task, LockSweepConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let handle = tokio::spawn(lock_sweep_task(store.clone(), LockSweepConfig::default(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! let metrics = handle.await?;
//! ```

use chrono::Utc;
use rolodex_storage::SharedStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Default sweep interval.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct LockSweepConfig {
    /// How often to look for expired locks (default: 60 seconds)
    pub interval: Duration,
}

impl Default for LockSweepConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl LockSweepConfig {
    pub fn every(interval: Duration) -> Self {
        Self { interval }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for sweep activity since startup.
#[derive(Debug, Default)]
pub struct LockSweepMetrics {
    /// Total locks cleared
    pub locks_cleared: AtomicU64,

    /// Total sweep cycles completed
    pub sweep_cycles: AtomicU64,

    /// Total store errors encountered
    pub sweep_errors: AtomicU64,
}

impl LockSweepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> LockSweepSnapshot {
        LockSweepSnapshot {
            locks_cleared: self.locks_cleared.load(Ordering::Relaxed),
            sweep_cycles: self.sweep_cycles.load(Ordering::Relaxed),
            sweep_errors: self.sweep_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSweepSnapshot {
    pub locks_cleared: u64,
    pub sweep_cycles: u64,
    pub sweep_errors: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Run the sweep until `shutdown_rx` turns true, then return the metrics.
///
/// The first sweep runs immediately.
pub async fn lock_sweep_task(
    store: SharedStore,
    config: LockSweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<LockSweepMetrics> {
    let metrics = Arc::new(LockSweepMetrics::new());

    let mut sweep_interval = interval(config.interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        "Lock sweep task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender also means shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Lock sweep task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                sweep_once(&store, &metrics).await;
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        locks_cleared = snapshot.locks_cleared,
        sweep_cycles = snapshot.sweep_cycles,
        sweep_errors = snapshot.sweep_errors,
        "Lock sweep task completed"
    );

    metrics
}

async fn sweep_once(store: &SharedStore, metrics: &LockSweepMetrics) {
    match store.clear_expired_locks(Utc::now()).await {
        Ok(cleared) => {
            metrics.locks_cleared.fetch_add(cleared, Ordering::Relaxed);
            if cleared > 0 {
                tracing::info!(cleared, "Expired edit locks cleared");
            }
        }
        Err(e) => {
            metrics.sweep_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "Lock sweep failed");
        }
    }
    metrics.sweep_cycles.fetch_add(1, Ordering::Relaxed);
}

// ============================================================================
// TESTS
// ============================================================================
