//! Media registry: visibility-filtered queries and privileged mutations over the
//! metadata store.

use std::sync::Arc;
use std::time::Duration;

use validator::Validate;
use zipdrop_core::constants::{SERVICE_BLOB_STORE, SERVICE_METADATA_STORE};
use zipdrop_core::{
    AccessPolicy, AppError, Capability, Clock, MediaRecord, MediaUpdate, NewMedia, Visibility,
};
use zipdrop_db::{MediaChanges, MediaFilter, MediaInsert, MediaOrder, MediaStore, StoreError};
use zipdrop_infra::bounded;
use zipdrop_storage::BlobStore;

use crate::counter::DownloadCounterCache;
use crate::lifecycle::MediaLifecycleService;

#[derive(Clone)]
pub struct MediaRegistry {
    media: Arc<dyn MediaStore>,
    blobs: Arc<dyn BlobStore>,
    counters: DownloadCounterCache,
    lifecycle: MediaLifecycleService,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl MediaRegistry {
    pub fn new(
        media: Arc<dyn MediaStore>,
        blobs: Arc<dyn BlobStore>,
        counters: DownloadCounterCache,
        lifecycle: MediaLifecycleService,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            media,
            blobs,
            counters,
            lifecycle,
            clock,
            timeout,
        }
    }

    async fn find(&self, filter: MediaFilter) -> Result<Vec<MediaRecord>, AppError> {
        bounded(
            SERVICE_METADATA_STORE,
            self.timeout,
            self.media.find_many(filter, MediaOrder::UpdatedAtDesc),
        )
        .await
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.find(MediaFilter::by_key(key)).await?.into_iter().next())
    }

    /// Records visible to `capability`, most recently updated first.
    #[tracing::instrument(skip(self, capability), fields(privileged = capability.is_privileged()))]
    pub async fn list(&self, capability: &Capability) -> Result<Vec<MediaRecord>, AppError> {
        let filter = if capability.is_privileged() {
            MediaFilter::all()
        } else {
            MediaFilter {
                visibility: Some(Visibility::Public),
                exclude_marked: true,
                ..MediaFilter::default()
            }
        };

        let records = self.find(filter).await?;
        Ok(records
            .into_iter()
            .filter(|record| AccessPolicy::can_list(capability, record))
            .collect())
    }

    /// Every record created by `owner_id`, regardless of visibility.
    #[tracing::instrument(skip(self, capability))]
    pub async fn list_owned_by(
        &self,
        capability: &Capability,
        owner_id: &str,
    ) -> Result<Vec<MediaRecord>, AppError> {
        AccessPolicy::ensure_can_mutate(capability)?;
        self.find(MediaFilter::by_owner(owner_id)).await
    }

    /// One record by id. Records the capability cannot see are reported as `NotFound`.
    pub async fn get(&self, capability: &Capability, id: i64) -> Result<MediaRecord, AppError> {
        self.find(MediaFilter::by_id(id))
            .await?
            .into_iter()
            .find(|record| AccessPolicy::can_list(capability, record))
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))
    }

    /// Register an uploaded blob. The download counter is initialised afterwards; if
    /// that fails the record still stands and its counter reads as zero.
    #[tracing::instrument(skip(self, capability, input), fields(media.key = %input.key))]
    pub async fn create(
        &self,
        capability: &Capability,
        input: NewMedia,
    ) -> Result<MediaRecord, AppError> {
        AccessPolicy::ensure_can_mutate(capability)?;
        input.validate()?;
        let owner_id = capability
            .identity()
            .ok_or_else(|| AppError::Unauthorized("Caller identity is required".to_string()))?
            .to_string();

        let fields = MediaInsert {
            key: input.key,
            name: input.name,
            size: input.size,
            owner_id,
            visibility: Visibility::default(),
            created_at: self.clock.now(),
        };
        let record = tokio::time::timeout(self.timeout, self.media.insert(fields))
            .await
            .map_err(|_| {
                AppError::upstream(
                    SERVICE_METADATA_STORE,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                )
            })?
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    AppError::Validation("Media with this key already exists".to_string())
                }
                other => AppError::upstream(SERVICE_METADATA_STORE, other.to_string()),
            })?;

        if let Err(e) = self.counters.reset(record.id).await {
            tracing::warn!(
                error = %e,
                media_id = record.id,
                "Download counter init failed, counter will read as zero"
            );
        }

        tracing::info!(media_id = record.id, "Media created");
        Ok(record)
    }

    /// Update the mutable fields of the record at `key` and reset its download count.
    #[tracing::instrument(skip(self, capability, update))]
    pub async fn edit(
        &self,
        capability: &Capability,
        key: &str,
        update: MediaUpdate,
    ) -> Result<MediaRecord, AppError> {
        AccessPolicy::ensure_can_mutate(capability)?;
        update.validate()?;

        let not_found = || AppError::NotFound(format!("Media with key '{}' not found", key));
        let existing = self.find_by_key(key).await?.ok_or_else(not_found)?;

        let changes = MediaChanges {
            name: update.name,
            size: update.size,
            visibility: update.visibility,
            updated_at: self.clock.now(),
        };
        let record = bounded(
            SERVICE_METADATA_STORE,
            self.timeout,
            self.media.update_by_key(key, changes),
        )
        .await?
        .ok_or_else(not_found)?;

        if record.name != existing.name {
            if let Err(e) = bounded(
                SERVICE_BLOB_STORE,
                self.timeout,
                self.blobs.rename_object(key, &record.name),
            )
            .await
            {
                tracing::warn!(error = %e, "Blob rename failed, display name left unchanged");
            }
        }

        if let Err(e) = self.counters.reset(record.id).await {
            tracing::error!(error = %e, media_id = record.id, "Counter reset failed after edit");
            return Err(AppError::partial("edit", &["metadata_update"], &e));
        }

        tracing::info!(media_id = record.id, "Media edited");
        Ok(record)
    }

    /// Coordinated removal. Removing a key with no record succeeds as a no-op.
    pub async fn remove(&self, capability: &Capability, key: &str) -> Result<(), AppError> {
        AccessPolicy::ensure_can_mutate(capability)?;
        self.lifecycle.remove_by_key(key).await?;
        Ok(())
    }
}
