#![allow(dead_code)]

pub mod faults;

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use zipdrop_core::{Capability, Clock, ManualClock, MediaRecord, NewMedia, Visibility};
use zipdrop_db::{CounterStore, MediaStore, MemoryCounterStore, MemoryMediaStore};
use zipdrop_services::{BlobStore, MediaService, MemoryStorage, ServiceSettings};

use faults::{FaultyBlobStore, FaultyCounterStore, FaultyMediaStore, Faults};

/// Half a minute past an hour boundary, so one-minute rate windows start mid-bucket.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 30).unwrap()
}

pub fn admin() -> Capability {
    Capability::privileged("admin_1")
}

pub fn upload(key: &str) -> NewMedia {
    NewMedia {
        key: key.to_string(),
        name: format!("{}.zip", key),
        size: 1024,
    }
}

pub fn record(id: i64, key: &str, visibility: Visibility, created_at: DateTime<Utc>) -> MediaRecord {
    MediaRecord {
        id,
        key: key.to_string(),
        name: format!("{}.zip", key),
        size: 1024,
        owner_id: "admin_1".to_string(),
        visibility,
        to_be_deleted: false,
        created_at,
        updated_at: created_at,
    }
}

/// Service over in-memory stores, with switchable faults on every collaborator.
pub struct TestEngine {
    pub service: MediaService,
    pub clock: ManualClock,
    pub media: MemoryMediaStore,
    pub counters: Arc<MemoryCounterStore>,
    pub blobs: Arc<MemoryStorage>,
    pub faults: Faults,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let clock = ManualClock::new(start_time());
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let media = MemoryMediaStore::new();
        let counters = Arc::new(MemoryCounterStore::new(shared_clock.clone()));
        let blobs = Arc::new(MemoryStorage::new());
        let faults = Faults::default();

        let media_store: Arc<dyn MediaStore> =
            Arc::new(FaultyMediaStore::new(media.clone(), faults.clone()));
        let counter_store: Arc<dyn CounterStore> =
            Arc::new(FaultyCounterStore::new(counters.clone(), faults.clone()));
        let blob_store: Arc<dyn BlobStore> =
            Arc::new(FaultyBlobStore::new(blobs.clone(), faults.clone()));

        let service = MediaService::new(media_store, counter_store, blob_store, shared_clock, settings);

        Self {
            service,
            clock,
            media,
            counters,
            blobs,
            faults,
        }
    }

    /// Register `key` through the service, with its blob present.
    pub async fn create(&self, key: &str) -> MediaRecord {
        self.blobs.insert(key).await;
        self.service
            .create_media(&admin(), upload(key))
            .await
            .expect("create should succeed")
    }

    /// Seed a record directly, bypassing the service, with its blob present.
    pub async fn seed(&self, record: MediaRecord) {
        self.blobs.insert(record.key.clone()).await;
        self.media.seed(record).await;
    }

    pub async fn download_count(&self, media_id: i64) -> i64 {
        self.service
            .counters()
            .get(media_id)
            .await
            .expect("counter read should succeed")
    }

    pub async fn has_blob(&self, key: &str) -> bool {
        self.blobs.exists(key).await.unwrap()
    }

    /// Raw counter-store value, `None` when the key is absent.
    pub async fn raw_counter(&self, media_id: i64) -> Option<i64> {
        self.counters
            .get(&format!("downloads:{}", media_id))
            .await
            .unwrap()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}
