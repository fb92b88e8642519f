use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::poller::Poller;

/// Fires the poller on a fixed cadence until stopped.
pub struct Scheduler {
    interval: Duration,
}

/// Handle to a running scheduler. Dropping it also stops the loop.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<Poller>,
}

impl Scheduler {
    /// `interval` must be non-zero.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the timer loop. The first cycle runs one interval after start.
    ///
    /// Each cycle is awaited inline, so cycles never overlap. Ticks that
    /// fall due while a cycle is still running are skipped, not queued.
    pub fn spawn(self, mut poller: Poller) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.interval;

        info!(interval_secs = interval.as_secs_f64(), "Starting ingest scheduler");

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        poller.run_cycle().await;
                    }
                }
            }

            info!("Ingest scheduler stopped. {}", poller.stats());
            poller
        });

        SchedulerHandle { stop_tx, join }
    }
}

impl SchedulerHandle {
    /// Signal the loop to stop and wait for it. A cycle already in flight is
    /// allowed to finish. Returns the poller with its final state.
    pub async fn stop(self) -> anyhow::Result<Poller> {
        // Err only if the loop already exited.
        let _ = self.stop_tx.send(true);
        Ok(self.join.await?)
    }
}
