//! Coordinated removal of a media record across the blob, metadata and counter stores.
//!
//! There is no cross-store transaction. Steps run in a fixed order and each one is
//! idempotent, so a failed removal is repaired by calling it again.

use std::sync::Arc;
use std::time::Duration;

use zipdrop_core::constants::{SERVICE_BLOB_STORE, SERVICE_METADATA_STORE};
use zipdrop_core::{AppError, MediaRecord};
use zipdrop_db::{MediaFilter, MediaOrder, MediaStore};
use zipdrop_infra::bounded;
use zipdrop_storage::BlobStore;

use crate::counter::DownloadCounterCache;

const STEP_BLOB_DELETE: &str = "blob_delete";
const STEP_METADATA_DELETE: &str = "metadata_delete";

#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    /// The record existed and every step completed
    Removed(MediaRecord),
    /// No record had this key; the blob delete was still issued
    AlreadyGone,
}

/// Service for media lifecycle operations shared by interactive removal and the sweeper.
#[derive(Clone)]
pub struct MediaLifecycleService {
    media: Arc<dyn MediaStore>,
    blobs: Arc<dyn BlobStore>,
    counters: DownloadCounterCache,
    timeout: Duration,
}

impl MediaLifecycleService {
    pub fn new(
        media: Arc<dyn MediaStore>,
        blobs: Arc<dyn BlobStore>,
        counters: DownloadCounterCache,
        timeout: Duration,
    ) -> Self {
        Self {
            media,
            blobs,
            counters,
            timeout,
        }
    }

    /// Remove the record stored under `key`.
    ///
    /// Order: flag the row (best-effort), delete the blob, delete the row, delete the
    /// counter. A blob failure leaves everything in place and yields
    /// `UpstreamUnavailable`. A later failure yields `PartialFailure` naming the
    /// steps that did complete.
    #[tracing::instrument(skip(self), fields(media.key = %key))]
    pub async fn remove_by_key(&self, key: &str) -> Result<RemovalOutcome, AppError> {
        let record = bounded(
            SERVICE_METADATA_STORE,
            self.timeout,
            self.media
                .find_many(MediaFilter::by_key(key), MediaOrder::default()),
        )
        .await?
        .into_iter()
        .next();

        if record.is_some() {
            if let Err(e) = bounded(
                SERVICE_METADATA_STORE,
                self.timeout,
                self.media.mark_for_deletion(key),
            )
            .await
            {
                tracing::warn!(error = %e, "Failed to flag media for deletion, continuing");
            }
        }

        let keys = [key.to_string()];
        bounded(
            SERVICE_BLOB_STORE,
            self.timeout,
            self.blobs.delete_objects(&keys),
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Blob delete failed, record left in place"))?;
        tracing::debug!("Blob deleted");

        let Some(record) = record else {
            tracing::debug!("No metadata for key, removal is a no-op");
            return Ok(RemovalOutcome::AlreadyGone);
        };

        if let Err(e) = bounded(
            SERVICE_METADATA_STORE,
            self.timeout,
            self.media.delete_by_key(key),
        )
        .await
        {
            tracing::error!(error = %e, media_id = record.id, "Metadata delete failed after blob delete");
            return Err(AppError::partial("remove", &[STEP_BLOB_DELETE], &e));
        }
        tracing::debug!(media_id = record.id, "Metadata deleted");

        if let Err(e) = self.counters.remove(record.id).await {
            tracing::error!(error = %e, media_id = record.id, "Counter delete failed after metadata delete");
            return Err(AppError::partial(
                "remove",
                &[STEP_BLOB_DELETE, STEP_METADATA_DELETE],
                &e,
            ));
        }

        tracing::info!(media_id = record.id, "Media removed");
        Ok(RemovalOutcome::Removed(record))
    }
}
