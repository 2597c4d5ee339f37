//! Background retention sweep for the spend ledger

use super::ledger::SpendLedger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Shortest interval between sweeps
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawn a task that prunes expired records every `every`.
///
/// The first sweep runs immediately. The task runs until the handle is aborted.
/// A zero `every` is raised to [`MIN_SWEEP_INTERVAL`].
pub fn spawn_retention_task(ledger: Arc<SpendLedger>, every: Duration) -> JoinHandle<()> {
    let every = every.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = ledger.prune_expired();
            if removed > 0 {
                info!(removed, "Retention sweep removed expired usage records");
            } else {
                debug!("Retention sweep found nothing to remove");
            }
        }
    })
}
