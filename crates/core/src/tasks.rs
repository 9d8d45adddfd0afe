//! Generic periodic background task with cooperative shutdown.
//!
//! Grounded on the teacher's session cleanup loop and job executor: a
//! `tokio::time::interval` tick loop selected against a shutdown channel,
//! wrapped in a handle the caller can use to request a clean stop and wait
//! for the in-flight tick to finish.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to a running periodic task. Dropping this without calling
/// [`PeriodicTask::shutdown`] leaves the task running detached.
pub struct PeriodicTask {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns `tick` on a `tokio::time::interval` of `period`, running it
    /// immediately and then every `period` thereafter until shutdown.
    ///
    /// `tick` errors are logged and do not stop the loop; a single failed
    /// pass should not take the scheduler down.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), crate::error::Error>> + Send,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            info!(task = name, period_secs = period.as_secs(), "background task started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = tick().await {
                            error!(task = name, error = %e, "background task tick failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!(task = name, "background task received shutdown signal");
                        break;
                    }
                }
            }

            info!(task = name, "background task stopped");
        });

        Self { shutdown_tx, handle }
    }

    /// Requests shutdown and waits for the current tick (if any) to finish.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).await.is_err() {
            warn!("background task already stopped before shutdown was requested");
        }
        if let Err(e) = self.handle.await {
            error!(error = %e, "background task panicked");
        }
    }
}
