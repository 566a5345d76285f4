use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;
use zipdrop_core::Clock;

use super::CounterStore;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: i64,
    expires_at: Option<DateTime<Utc>>,
}

impl CounterEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process counter store.
///
/// Keys are spread over independently locked shards. Each operation holds its shard
/// lock for the whole read-modify-write, which makes `increment` atomic per key.
/// Expiry is evaluated against the injected clock.
#[derive(Clone)]
pub struct MemoryCounterStore {
    shards: Vec<Arc<Mutex<HashMap<String, CounterEntry>>>>,
    shard_count: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryCounterStore {
    /// Create a store with the default shard count (16 shards)
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_shards(clock, 16)
    }

    pub fn with_shards(clock: Arc<dyn Clock>, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            shard_count,
            clock,
        }
    }

    fn shard(&self, key: &str) -> &Arc<Mutex<HashMap<String, CounterEntry>>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shard_count]
    }

    /// Number of live keys, across all shards
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.values().filter(|e| e.is_live(now)).count();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let now = self.clock.now();
        let shard = self.shard(key).lock().await;
        Ok(shard
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut shard = self.shard(key).lock().await;
        shard.insert(
            key.to_string(),
            CounterEntry {
                value,
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        let now = self.clock.now();
        let mut shard = self.shard(key).lock().await;
        let entry = shard
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_live(now) {
                    entry.value += delta;
                } else {
                    entry.value = delta;
                    entry.expires_at = ttl.map(|ttl| now + ttl);
                }
            })
            .or_insert(CounterEntry {
                value: delta,
                expires_at: ttl.map(|ttl| now + ttl),
            });
        Ok(entry.value)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.shard(key).lock().await.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut purged = 0u64;
        for shard in &self.shards {
            let mut shard = shard.lock().await;
            let before = shard.len();
            shard.retain(|_, entry| entry.is_live(now));
            purged += (before - shard.len()) as u64;
        }
        Ok(purged)
    }
}
