//! Store and service wiring

use anyhow::Result;
use std::sync::Arc;
use zipdrop_core::{Clock, Config, StoreBackend, SystemClock};
use zipdrop_db::{
    CounterStore, MediaStore, MemoryCounterStore, MemoryMediaStore, PgCounterStore, PgMediaStore,
};
use zipdrop_services::{create_storage, MediaService, ServiceSettings};

/// Construct the metadata, counter and blob stores selected by `config` and the
/// [`MediaService`] over them.
pub async fn initialize_services(config: &Config) -> Result<MediaService> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (media, counters): (Arc<dyn MediaStore>, Arc<dyn CounterStore>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let pool = super::database::setup_database(config).await?;
                (
                    Arc::new(PgMediaStore::new(pool.clone())),
                    Arc::new(PgCounterStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory metadata and counter stores; data is lost on restart");
                (
                    Arc::new(MemoryMediaStore::new()),
                    Arc::new(MemoryCounterStore::new(clock.clone())),
                )
            }
        };

    let blobs = create_storage(config).await?;
    tracing::info!(
        store_backend = %config.store_backend,
        storage_backend = %blobs.backend_type(),
        media_ttl_hours = config.media_ttl_hours,
        "Services initialized"
    );

    Ok(MediaService::new(
        media,
        counters,
        blobs,
        clock,
        ServiceSettings::from_config(config),
    ))
}
