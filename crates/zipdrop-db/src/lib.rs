//! Data access layer
//!
//! Two stores back the engine: the metadata store holding [`MediaRecord`] rows and the
//! counter store used for download counts and rate-limit buckets. Each has a Postgres
//! implementation and an in-memory twin with identical semantics.
//!
//! [`MediaRecord`]: zipdrop_core::MediaRecord

pub mod counter;
pub mod error;
pub mod media;

pub use counter::{CounterStore, MemoryCounterStore, PgCounterStore};
pub use error::StoreError;
pub use media::{
    MediaChanges, MediaFilter, MediaInsert, MediaOrder, MediaStore, MemoryMediaStore,
    PgMediaStore,
};
