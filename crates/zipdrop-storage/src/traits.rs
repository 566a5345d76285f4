//! Blob store abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;
use zipdrop_core::constants::SERVICE_BLOB_STORE;
use zipdrop_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Rename failed: {0}")]
    RenameFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("Blob not found: {}", key)),
            other => AppError::upstream(SERVICE_BLOB_STORE, other.to_string()),
        }
    }
}

/// Blob store trait
///
/// Every backend (S3, local filesystem, in-memory) implements these operations with
/// the same idempotence rules, so the removal path can retry without caring which
/// provider sits behind it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Delete every object in `keys`. Keys that are already gone count as deleted.
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()>;

    /// Set the display name shown for the blob at `key`.
    ///
    /// Fails with `NotFound` when the blob does not exist.
    async fn rename_object(&self, key: &str, new_name: &str) -> StorageResult<()>;

    /// Check if a blob exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Publicly reachable URL for the blob
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
