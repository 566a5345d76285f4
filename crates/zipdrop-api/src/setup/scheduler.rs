//! Periodic sweep trigger for the API binary

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use zipdrop_services::MediaService;

/// Rate-limit identity of scheduled sweeps
pub const SCHEDULER_IDENTITY: &str = "scheduler";

/// Trigger a sweep every `period`. Returns a JoinHandle for graceful shutdown.
pub fn start_sweep_scheduler(service: MediaService, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            tracing::info!("Starting scheduled sweep of expired media");

            match service.sweep_expired(SCHEDULER_IDENTITY).await {
                Ok(report) => tracing::debug!(
                    removed = report.removed_count,
                    failed = report.failures.len(),
                    "Scheduled sweep finished"
                ),
                Err(e) => tracing::error!(error = %e, "Scheduled sweep failed"),
            }
        }
    })
}
