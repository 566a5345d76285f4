//! Store wrappers that fail on demand

use async_trait::async_trait;
use chrono::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use zipdrop_core::{MediaRecord, StorageBackend};
use zipdrop_db::{
    CounterStore, MediaChanges, MediaFilter, MediaInsert, MediaOrder, MediaStore,
    MemoryCounterStore, MemoryMediaStore, StoreError,
};
use zipdrop_services::{BlobStore, MemoryStorage, StorageError};

#[derive(Clone, Default)]
pub struct Faults {
    pub blob_delete: Arc<AtomicBool>,
    pub metadata_delete: Arc<AtomicBool>,
    pub counter_set: Arc<AtomicBool>,
    pub counter_delete: Arc<AtomicBool>,
    /// Every counter-store call fails
    pub counter_store_down: Arc<AtomicBool>,
    /// Blob deletes fail only for these keys
    pub blob_delete_keys: Arc<Mutex<Vec<String>>>,
}

impl Faults {
    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn heal(flag: &AtomicBool) {
        flag.store(false, Ordering::SeqCst);
    }

    pub fn fail_blob_delete_for(&self, key: &str) {
        self.blob_delete_keys
            .lock()
            .unwrap()
            .push(key.to_string());
    }
}

fn on(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {} failure", what))
}

pub struct FaultyMediaStore {
    inner: MemoryMediaStore,
    faults: Faults,
}

impl FaultyMediaStore {
    pub fn new(inner: MemoryMediaStore, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

#[async_trait]
impl MediaStore for FaultyMediaStore {
    async fn insert(&self, fields: MediaInsert) -> Result<MediaRecord, StoreError> {
        self.inner.insert(fields).await
    }

    async fn update_by_key(
        &self,
        key: &str,
        changes: MediaChanges,
    ) -> Result<Option<MediaRecord>, StoreError> {
        self.inner.update_by_key(key, changes).await
    }

    async fn delete_by_key(&self, key: &str) -> Result<Option<MediaRecord>, StoreError> {
        if on(&self.faults.metadata_delete) {
            return Err(unavailable("metadata delete"));
        }
        self.inner.delete_by_key(key).await
    }

    async fn find_many(
        &self,
        filter: MediaFilter,
        order: MediaOrder,
    ) -> Result<Vec<MediaRecord>, StoreError> {
        self.inner.find_many(filter, order).await
    }

    async fn mark_for_deletion(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.mark_for_deletion(key).await
    }
}

pub struct FaultyCounterStore {
    inner: Arc<MemoryCounterStore>,
    faults: Faults,
}

impl FaultyCounterStore {
    pub fn new(inner: Arc<MemoryCounterStore>, faults: Faults) -> Self {
        Self { inner, faults }
    }

    fn check(&self) -> Result<(), StoreError> {
        if on(&self.faults.counter_store_down) {
            return Err(unavailable("counter store"));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for FaultyCounterStore {
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.check()?;
        if on(&self.faults.counter_set) {
            return Err(unavailable("counter set"));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        self.check()?;
        self.inner.increment(key, delta, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        if on(&self.faults.counter_delete) {
            return Err(unavailable("counter delete"));
        }
        self.inner.delete(key).await
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.purge_expired().await
    }
}

pub struct FaultyBlobStore {
    inner: Arc<MemoryStorage>,
    faults: Faults,
}

impl FaultyBlobStore {
    pub fn new(inner: Arc<MemoryStorage>, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    async fn delete_objects(&self, keys: &[String]) -> Result<(), StorageError> {
        let targeted = {
            let failing = self.faults.blob_delete_keys.lock().unwrap();
            keys.iter().any(|key| failing.contains(key))
        };
        if on(&self.faults.blob_delete) || targeted {
            return Err(StorageError::DeleteFailed("injected blob delete failure".to_string()));
        }
        self.inner.delete_objects(keys).await
    }

    async fn rename_object(&self, key: &str, new_name: &str) -> Result<(), StorageError> {
        self.inner.rename_object(key, new_name).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
