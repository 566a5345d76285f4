//! Service facade exposing the engine's operations to callers.

use std::sync::Arc;

use zipdrop_core::constants::SERVICE_METADATA_STORE;
use zipdrop_core::{AppError, Capability, Clock, MediaRecord, MediaUpdate, NewMedia};
use zipdrop_db::{CounterStore, MediaFilter, MediaOrder, MediaStore};
use zipdrop_infra::{bounded, RateLimiter, RateScope};
use zipdrop_storage::BlobStore;

use crate::cleanup::{LifecycleSweeper, SweepReport};
use crate::counter::DownloadCounterCache;
use crate::lifecycle::MediaLifecycleService;
use crate::registry::MediaRegistry;
use crate::settings::ServiceSettings;

/// Wires the registry, counters, limiter and sweeper over one set of stores.
///
/// Every collaborator is passed in; nothing is held in process-wide state.
#[derive(Clone)]
pub struct MediaService {
    registry: MediaRegistry,
    counters: DownloadCounterCache,
    limiter: RateLimiter,
    sweeper: LifecycleSweeper,
    media: Arc<dyn MediaStore>,
    blobs: Arc<dyn BlobStore>,
    settings: ServiceSettings,
}

impl MediaService {
    pub fn new(
        media: Arc<dyn MediaStore>,
        counter_store: Arc<dyn CounterStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let timeout = settings.upstream_timeout;
        let counters = DownloadCounterCache::new(counter_store.clone(), timeout);
        let limiter = RateLimiter::new(
            counter_store.clone(),
            clock.clone(),
            settings.rate_limits,
            timeout,
        );
        let lifecycle =
            MediaLifecycleService::new(media.clone(), blobs.clone(), counters.clone(), timeout);
        let registry = MediaRegistry::new(
            media.clone(),
            blobs.clone(),
            counters.clone(),
            lifecycle.clone(),
            clock.clone(),
            timeout,
        );
        let sweeper = LifecycleSweeper::new(
            media.clone(),
            counter_store,
            lifecycle,
            limiter.clone(),
            clock,
            settings.media_ttl,
            settings.sweep_concurrency,
            timeout,
        );

        Self {
            registry,
            counters,
            limiter,
            sweeper,
            media,
            blobs,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Shared limiter, also used by the HTTP layer for the general scope
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn counters(&self) -> &DownloadCounterCache {
        &self.counters
    }

    /// Where clients fetch the blob stored under `key`.
    pub fn blob_url(&self, key: &str) -> String {
        self.blobs.public_url(key)
    }

    pub async fn list_media(&self, capability: &Capability) -> Result<Vec<MediaRecord>, AppError> {
        self.registry.list(capability).await
    }

    pub async fn list_owned_by(
        &self,
        capability: &Capability,
        owner_id: &str,
    ) -> Result<Vec<MediaRecord>, AppError> {
        self.registry.list_owned_by(capability, owner_id).await
    }

    pub async fn get_media(&self, capability: &Capability, id: i64) -> Result<MediaRecord, AppError> {
        self.registry.get(capability, id).await
    }

    pub async fn create_media(
        &self,
        capability: &Capability,
        upload: NewMedia,
    ) -> Result<MediaRecord, AppError> {
        self.registry.create(capability, upload).await
    }

    pub async fn edit_media(
        &self,
        capability: &Capability,
        key: &str,
        fields: MediaUpdate,
    ) -> Result<MediaRecord, AppError> {
        self.registry.edit(capability, key, fields).await
    }

    pub async fn remove_media(&self, capability: &Capability, key: &str) -> Result<(), AppError> {
        self.registry.remove(capability, key).await
    }

    /// Downloads of `media_id` since creation or its last edit. An absent counter reads as zero.
    pub async fn download_count(&self, media_id: i64) -> Result<i64, AppError> {
        self.counters.get(media_id).await
    }

    /// Apply the download-scope limit for `client_identity`, then count one download
    /// of `media_id`. Returns the new count.
    #[tracing::instrument(skip(self))]
    pub async fn record_download(
        &self,
        media_id: i64,
        client_identity: &str,
    ) -> Result<i64, AppError> {
        self.limiter
            .enforce(RateScope::Download, client_identity)
            .await?;

        let exists = !bounded(
            SERVICE_METADATA_STORE,
            self.settings.upstream_timeout,
            self.media
                .find_many(MediaFilter::by_id(media_id), MediaOrder::default()),
        )
        .await?
        .is_empty();
        if !exists {
            return Err(AppError::NotFound(format!("Media {} not found", media_id)));
        }

        self.counters.increment(media_id).await
    }

    pub async fn sweep_expired(&self, triggering_identity: &str) -> Result<SweepReport, AppError> {
        self.sweeper.sweep(triggering_identity).await
    }
}
