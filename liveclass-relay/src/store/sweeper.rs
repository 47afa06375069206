use crate::store::signal_store::SignalStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodically garbage-collects signals nobody polled within the TTL.
/// Stops when `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_sweeper(
    store: Arc<dyn SignalStore>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Signal sweeper started (every {:?})", every);

        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = tick.tick() => {}
            }

            match store.purge_expired().await {
                Ok(0) => debug!("Sweep found nothing to purge"),
                Ok(purged) => info!("Purged {} expired signal(s)", purged),
                Err(e) => warn!("Signal sweep failed: {}", e),
            }
        }

        info!("Signal sweeper stopped");
    })
}
