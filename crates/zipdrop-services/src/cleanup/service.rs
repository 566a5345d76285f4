use chrono::Duration as ChronoDuration;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use zipdrop_core::constants::{SERVICE_COUNTER_STORE, SERVICE_METADATA_STORE};
use zipdrop_core::{AppError, Clock, ErrorKind};
use zipdrop_db::{CounterStore, MediaFilter, MediaOrder, MediaStore};
use zipdrop_infra::{bounded, RateLimiter, RateScope};

use crate::lifecycle::{MediaLifecycleService, RemovalOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub key: String,
    pub error_kind: ErrorKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub removed_count: usize,
    pub failures: Vec<SweepFailure>,
}

/// Removes records whose age has reached the TTL.
///
/// Pull-based: each call to [`sweep`](Self::sweep) is one pass and callers decide when
/// to trigger it. Records are removed independently and concurrently; one failure never
/// stops the rest.
#[derive(Clone)]
pub struct LifecycleSweeper {
    media: Arc<dyn MediaStore>,
    counter_store: Arc<dyn CounterStore>,
    lifecycle: MediaLifecycleService,
    limiter: RateLimiter,
    clock: Arc<dyn Clock>,
    ttl: ChronoDuration,
    concurrency: usize,
    timeout: Duration,
}

impl LifecycleSweeper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        media: Arc<dyn MediaStore>,
        counter_store: Arc<dyn CounterStore>,
        lifecycle: MediaLifecycleService,
        limiter: RateLimiter,
        clock: Arc<dyn Clock>,
        ttl: ChronoDuration,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            media,
            counter_store,
            lifecycle,
            limiter,
            clock,
            ttl,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Run one sweep pass on behalf of `triggering_identity`.
    ///
    /// Rate limited on the sweep scope before any work is done.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "sweep"))]
    pub async fn sweep(&self, triggering_identity: &str) -> Result<SweepReport, AppError> {
        self.limiter
            .enforce(RateScope::Sweep, triggering_identity)
            .await?;

        let now = self.clock.now();
        let records = bounded(
            SERVICE_METADATA_STORE,
            self.timeout,
            self.media
                .find_many(MediaFilter::all(), MediaOrder::CreatedAtAsc),
        )
        .await?;
        let examined = records.len();

        let expired: Vec<String> = records
            .into_iter()
            .filter(|record| record.is_expired(now, self.ttl))
            .map(|record| record.key)
            .collect();

        let outcomes: Vec<(String, Result<RemovalOutcome, AppError>)> = stream::iter(expired)
            .map(|key| async move {
                let outcome = self.lifecycle.remove_by_key(&key).await;
                (key, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = SweepReport::default();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(RemovalOutcome::Removed(record)) => {
                    tracing::info!(media_id = record.id, media.key = %key, "Removed expired media");
                    report.removed_count += 1;
                }
                Ok(RemovalOutcome::AlreadyGone) => {
                    tracing::debug!(media.key = %key, "Expired media already removed");
                }
                Err(e) => {
                    tracing::error!(error = %e, media.key = %key, "Failed to remove expired media");
                    report.failures.push(SweepFailure {
                        key,
                        error_kind: e.kind(),
                    });
                }
            }
        }
        report.failures.sort_by(|a, b| a.key.cmp(&b.key));

        match bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.counter_store.purge_expired(),
        )
        .await
        {
            Ok(purged) => tracing::debug!(purged, "Purged expired counters"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired counters"),
        }

        tracing::info!(
            examined,
            removed = report.removed_count,
            failed = report.failures.len(),
            "Sweep completed"
        );
        Ok(report)
    }
}
