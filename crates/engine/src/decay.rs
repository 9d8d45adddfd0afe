//! Decay Scheduler (spec §4.7): the single long-lived background task that
//! periodically multiplies every non-zero score by `decay_factor`.

use crate::store::Store;
use risk_core::config::ScoringConfig;
use risk_core::PeriodicTask;
use std::time::Duration;
use tracing::info;

/// Spawns the decay loop. `PeriodicTask` already guarantees a pass must
/// finish before the next tick is considered (spec: "re-entrancy is
/// disallowed"), and failed passes are logged and skipped rather than
/// retried mid-interval (spec: "a backlog is never accumulated").
pub fn spawn(store: Store, scoring: ScoringConfig) -> PeriodicTask {
    let period = Duration::from_secs(scoring.decay_interval_secs);
    let factor = scoring.decay_factor;

    PeriodicTask::spawn("decay-scheduler", period, move || {
        let store = store.clone();
        async move {
            let affected = crate::score::decay_all(store.pool(), factor)
                .await
                .map_err(|e| risk_core::Error::transient(e.to_string()))?;
            if affected > 0 {
                info!(affected, factor, "decay pass completed");
            }
            Ok(())
        }
    })
}
