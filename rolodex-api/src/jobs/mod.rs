//! Background Jobs for Rolodex API
//!
//! - `lock_sweep`: clears expired edit locks (enabled by
//!   `ROLODEX_LOCK_SWEEP_SECS`)
//!
//! Jobs are spawned at startup and stopped through a `watch` channel:
//!
//! ```ignore
//! use rolodex_api::jobs::{lock_sweep_task, LockSweepConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(lock_sweep_task(store.clone(), LockSweepConfig::default(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod lock_sweep;

pub use lock_sweep::{lock_sweep_task, LockSweepConfig, LockSweepMetrics, LockSweepSnapshot};
