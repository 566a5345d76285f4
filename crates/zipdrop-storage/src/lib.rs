//! Zipdrop Storage Library
//!
//! Blob store abstraction used by the removal path and by edits. Uploads happen
//! directly between clients and the provider, so the trait only covers deletion,
//! display-name rename and URL construction.
//!
//! # Key format
//!
//! Keys are opaque provider locators chosen at upload time. They must not contain `..`
//! or a leading `/`. A blob's display name, when set, is kept in a sidecar object at
//! `{key}.name`.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobStore, StorageError, StorageResult};
pub use zipdrop_core::StorageBackend;
