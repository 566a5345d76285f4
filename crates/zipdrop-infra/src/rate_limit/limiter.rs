use chrono::Duration as ChronoDuration;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use zipdrop_core::constants::{
    RATE_LIMIT_PREFIX, SCOPE_DOWNLOAD, SCOPE_GENERAL, SCOPE_SWEEP, SERVICE_COUNTER_STORE,
};
use zipdrop_core::{AppError, Clock, RateLimitSettings, ScopeLimit};
use zipdrop_db::CounterStore;

use crate::upstream::bounded;

/// Throttled action class. Each scope has its own `(N, W)` and outage policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    /// All inbound HTTP traffic, keyed by client IP
    General,
    /// Download events
    Download,
    /// Sweep invocations
    Sweep,
}

impl RateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateScope::General => SCOPE_GENERAL,
            RateScope::Download => SCOPE_DOWNLOAD,
            RateScope::Sweep => SCOPE_SWEEP,
        }
    }
}

impl Display for RateScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `allow` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub permitted: bool,
    /// Further events the identity may make right now
    pub remaining: u32,
    pub limit: u32,
    /// Zero when permitted; otherwise time until a retry is expected to pass
    pub retry_after: Duration,
}

impl RateDecision {
    /// Turn a denial into `AppError::RateLimited`.
    pub fn into_result(self, scope: RateScope) -> Result<RateDecision, AppError> {
        if self.permitted {
            Ok(self)
        } else {
            Err(AppError::RateLimited {
                scope: scope.to_string(),
                retry_after_secs: self.retry_after.as_secs().max(1),
            })
        }
    }
}

/// Sliding-window rate limiter.
///
/// Time is cut into buckets of width `W`. The effective count at `t` is
/// `current + previous * (1 - elapsed_in_current / W)`; an event is permitted while
/// that count, including the event itself, is `<= N`.
///
/// The current bucket is incremented before the check so that concurrent callers each
/// observe a distinct count. A denied event is rolled back with a decrement, so only
/// permitted events stay recorded.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    settings: RateLimitSettings,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
        settings: RateLimitSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
            timeout,
        }
    }

    pub fn limit(&self, scope: RateScope) -> ScopeLimit {
        match scope {
            RateScope::General => self.settings.general,
            RateScope::Download => self.settings.download,
            RateScope::Sweep => self.settings.sweep,
        }
    }

    fn bucket_key(scope: RateScope, identity: &str, bucket: i64) -> String {
        format!("{}:{}:{}:{}", RATE_LIMIT_PREFIX, scope, identity, bucket)
    }

    /// Record one event for `(scope, identity)` and decide whether it may proceed.
    ///
    /// Counter-store failures follow the scope's `fail_open` setting: permit with a
    /// warning, or fail with `UpstreamUnavailable`.
    #[tracing::instrument(skip(self), fields(rate_limit.scope = %scope))]
    pub async fn allow(&self, scope: RateScope, identity: &str) -> Result<RateDecision, AppError> {
        let limit = self.limit(scope);
        match self.check(scope, identity, limit).await {
            Ok(decision) => Ok(decision),
            Err(err) if limit.fail_open => {
                tracing::warn!(
                    scope = %scope,
                    identity = %identity,
                    error = %err,
                    "Counter store unavailable, failing open"
                );
                Ok(RateDecision {
                    permitted: true,
                    remaining: limit.max,
                    limit: limit.max,
                    retry_after: Duration::ZERO,
                })
            }
            Err(err) => {
                tracing::error!(
                    scope = %scope,
                    identity = %identity,
                    error = %err,
                    "Counter store unavailable, failing closed"
                );
                Err(err)
            }
        }
    }

    /// `allow`, with a denial mapped to `AppError::RateLimited`.
    pub async fn enforce(&self, scope: RateScope, identity: &str) -> Result<RateDecision, AppError> {
        self.allow(scope, identity).await?.into_result(scope)
    }

    async fn check(
        &self,
        scope: RateScope,
        identity: &str,
        limit: ScopeLimit,
    ) -> Result<RateDecision, AppError> {
        let window_ms = (limit.window_secs as i64).saturating_mul(1000).max(1);
        let now_ms = self.clock.now().timestamp_millis();
        let bucket = now_ms.div_euclid(window_ms);
        let elapsed_ms = now_ms.rem_euclid(window_ms);

        let current_key = Self::bucket_key(scope, identity, bucket);
        let previous_key = Self::bucket_key(scope, identity, bucket - 1);
        // Buckets are read for one more window after they close
        let ttl = Some(ChronoDuration::milliseconds(window_ms * 2));

        let current = bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.store.increment(&current_key, 1, ttl),
        )
        .await?;
        let previous = bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.store.get(&previous_key),
        )
        .await?
        .unwrap_or(0);

        let weight = 1.0 - (elapsed_ms as f64 / window_ms as f64);
        let effective = current as f64 + previous as f64 * weight;
        let max = limit.max as f64;

        if effective <= max {
            return Ok(RateDecision {
                permitted: true,
                remaining: (max - effective).floor().max(0.0) as u32,
                limit: limit.max,
                retry_after: Duration::ZERO,
            });
        }

        if let Err(err) = bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.store.increment(&current_key, -1, ttl),
        )
        .await
        {
            tracing::warn!(key = %current_key, error = %err, "Failed to roll back denied event");
        }

        let retry_after_ms = retry_after_ms(
            current - 1,
            previous,
            limit.max as i64,
            elapsed_ms,
            window_ms,
        );
        tracing::info!(
            scope = %scope,
            identity = %identity,
            effective_count = effective,
            limit = limit.max,
            retry_after_ms,
            "Rate limit exceeded"
        );

        Ok(RateDecision {
            permitted: false,
            remaining: 0,
            limit: limit.max,
            retry_after: Duration::from_millis(retry_after_ms.max(0) as u64),
        })
    }
}

/// Milliseconds until one more event would be permitted, assuming no other traffic.
///
/// `current` and `previous` are the recorded counts of the current and preceding
/// buckets, excluding the denied event.
fn retry_after_ms(current: i64, previous: i64, max: i64, elapsed_ms: i64, window_ms: i64) -> i64 {
    let window = window_ms as f64;
    let headroom = (max - current - 1) as f64;

    // Still inside the current bucket: wait for the previous bucket's weight to decay
    if headroom >= 0.0 && previous > 0 {
        let at = window * (1.0 - headroom / previous as f64);
        return (at.ceil() as i64 - elapsed_ms).max(0);
    }

    // Otherwise the current bucket becomes the previous one
    let until_next = window_ms - elapsed_ms;
    let decay = if current > max - 1 && current > 0 {
        (window * (1.0 - (max - 1) as f64 / current as f64)).ceil() as i64
    } else {
        0
    };
    until_next + decay
}
