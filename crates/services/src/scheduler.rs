//! # Expiration Scheduler
//!
//! Owned background task that runs the sweep once at start and then on a
//! fixed interval. Sweeps run inline in the loop, so two ticks never overlap;
//! a tick that comes due while a sweep is still running is skipped.

use std::sync::Arc;
use std::time::Duration;

use domains::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::sweep::ExpirationSweeper;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub struct ExpirationScheduler {
    sweeper: Arc<ExpirationSweeper>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirationScheduler {
    pub fn new(sweeper: Arc<ExpirationSweeper>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sweeper,
            clock,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the loop on the current runtime.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!(interval_secs = self.interval.as_secs(), "expiration scheduler started");
        let join = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle { shutdown_tx, join }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    let report = self.sweeper.run(now).await;
                    info!(
                        processed = report.processed,
                        reset = report.reset,
                        notified = report.notified,
                        failed = report.failed,
                        notify_failed = report.notify_failed,
                        "expiration sweep finished"
                    );
                }
            }
        }
        info!("expiration scheduler stopped");
    }
}

/// Dropping the handle also stops the loop at its next wake-up.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Asks the loop to stop. A sweep already in progress finishes first.
    pub fn request_shutdown(&self) {
        // receiver is gone if the task already exited
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown(self) {
        self.request_shutdown();
        if let Err(err) = self.join.await {
            warn!(error = %err, "expiration scheduler task ended abnormally");
        }
    }
}
