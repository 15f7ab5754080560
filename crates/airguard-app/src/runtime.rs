//! The global registry clock
//!
//! One tokio task ticks every active session once per wall-clock second —
//! ticking is deliberately not per-surface, so sessions that are not
//! currently displayed never drift. The task also watches for suspension:
//! when the gap since the previous tick exceeds the threshold, the whole
//! gap is reconciled in one step instead of replaying missed ticks.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use airguard_core::prelude::*;

use crate::registry::{SessionRegistry, SharedRegistry, TimerExpiry};

/// Tick gaps longer than this are treated as a suspension, seconds.
pub const SUSPENSION_GAP_THRESHOLD_SECS: u64 = 2;

/// Wrap a registry for sharing with the clock task and controllers.
pub fn share(registry: SessionRegistry) -> SharedRegistry {
    Arc::new(Mutex::new(registry))
}

/// Spawn the once-per-second clock over `registry`.
///
/// Timer expiries are forwarded on `expiry_tx`; the task stops when
/// `shutdown_rx` observes `true` (or its sender is dropped).
pub fn spawn_clock(
    registry: SharedRegistry,
    expiry_tx: mpsc::UnboundedSender<TimerExpiry>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // After a suspension only one tick fires; the measured gap carries
        // the missed time into reconciliation.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_tick = Instant::now();
        info!("registry clock started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    let gap_secs = now.duration_since(last_tick).as_secs();
                    last_tick = now;

                    let expiries = {
                        let mut registry = registry
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        if gap_secs > SUSPENSION_GAP_THRESHOLD_SECS {
                            registry.reconcile_background(Duration::from_secs(gap_secs))
                        } else {
                            registry.tick()
                        }
                    };

                    for expiry in expiries {
                        if expiry_tx.send(expiry).is_err() {
                            // Receiver gone; expiries are already logged by
                            // the registry, keep ticking.
                            break;
                        }
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("registry clock stopped");
    })
}
