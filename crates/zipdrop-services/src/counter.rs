//! Per-media download counters

use std::sync::Arc;
use std::time::Duration;

use zipdrop_core::constants::{DOWNLOAD_COUNTER_PREFIX, SERVICE_COUNTER_STORE};
use zipdrop_core::AppError;
use zipdrop_db::CounterStore;
use zipdrop_infra::bounded;

/// Download counter per media id, backed by the shared counter store.
///
/// An absent counter reads as zero, which covers records whose counter
/// initialisation failed at create time.
#[derive(Clone)]
pub struct DownloadCounterCache {
    store: Arc<dyn CounterStore>,
    timeout: Duration,
}

impl DownloadCounterCache {
    pub fn new(store: Arc<dyn CounterStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    fn key(media_id: i64) -> String {
        format!("{}:{}", DOWNLOAD_COUNTER_PREFIX, media_id)
    }

    pub async fn get(&self, media_id: i64) -> Result<i64, AppError> {
        let key = Self::key(media_id);
        let value = bounded(SERVICE_COUNTER_STORE, self.timeout, self.store.get(&key)).await?;
        Ok(value.unwrap_or(0))
    }

    /// Atomically add one and return the new value.
    #[tracing::instrument(skip(self))]
    pub async fn increment(&self, media_id: i64) -> Result<i64, AppError> {
        let key = Self::key(media_id);
        bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.store.increment(&key, 1, None),
        )
        .await
    }

    pub async fn reset(&self, media_id: i64) -> Result<(), AppError> {
        let key = Self::key(media_id);
        bounded(
            SERVICE_COUNTER_STORE,
            self.timeout,
            self.store.set(&key, 0, None),
        )
        .await
    }

    pub async fn remove(&self, media_id: i64) -> Result<(), AppError> {
        let key = Self::key(media_id);
        bounded(SERVICE_COUNTER_STORE, self.timeout, self.store.delete(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use zipdrop_core::{Clock, ManualClock};
    use zipdrop_db::MemoryCounterStore;

    fn cache() -> DownloadCounterCache {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));
        DownloadCounterCache::new(
            Arc::new(MemoryCounterStore::new(clock)),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_absent_counter_reads_zero() {
        assert_eq!(cache().get(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_reset_remove() {
        let counters = cache();
        assert_eq!(counters.increment(42).await.unwrap(), 1);
        assert_eq!(counters.increment(42).await.unwrap(), 2);

        counters.reset(42).await.unwrap();
        counters.reset(42).await.unwrap();
        assert_eq!(counters.get(42).await.unwrap(), 0);

        counters.increment(42).await.unwrap();
        counters.remove(42).await.unwrap();
        counters.remove(42).await.unwrap();
        assert_eq!(counters.get(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counters_are_per_media() {
        let counters = cache();
        counters.increment(1).await.unwrap();
        counters.increment(2).await.unwrap();
        counters.increment(2).await.unwrap();
        assert_eq!(counters.get(1).await.unwrap(), 1);
        assert_eq!(counters.get(2).await.unwrap(), 2);
    }
}
