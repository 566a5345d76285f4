//! Atomic counter store
//!
//! Single-key integer counters with optional expiry. Every operation is atomic on its
//! key; no multi-key transactions are offered.

mod memory;
mod postgres;

pub use memory::MemoryCounterStore;
pub use postgres::PgCounterStore;

use async_trait::async_trait;
use chrono::Duration;

use crate::error::StoreError;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Overwrite the value. `ttl` replaces any previous expiry; `None` keeps the key forever.
    async fn set(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Add `delta` and return the post-increment value in one atomic step.
    ///
    /// A missing or expired key starts from zero and takes `ttl` as its expiry. An
    /// existing key keeps the expiry it was created with.
    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError>;

    /// Remove the key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Drop expired keys, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}
