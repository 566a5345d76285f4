//! Zipdrop Services Layer
//!
//! Business services of the ephemeral-media engine: download counters, the media
//! registry, coordinated removal, the TTL sweeper, and the [`MediaService`] facade
//! the API crate calls into. Keep coordination here and HTTP concerns in zipdrop-api.

pub mod cleanup;
pub mod counter;
pub mod lifecycle;
pub mod media;
pub mod registry;
pub mod settings;

pub use cleanup::{LifecycleSweeper, SweepFailure, SweepReport};
pub use counter::DownloadCounterCache;
pub use lifecycle::{MediaLifecycleService, RemovalOutcome};
pub use media::MediaService;
pub use registry::MediaRegistry;
pub use settings::ServiceSettings;

pub use zipdrop_infra::{RateDecision, RateLimiter, RateScope};
pub use zipdrop_storage::{create_storage, BlobStore, MemoryStorage, StorageError};
