use crate::keys::{name_sidecar_key, validate_key};
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blobs (e.g., "/var/lib/zipdrop/media")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a key to a filesystem path under the base directory
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn remove_if_present(&self, path: &Path) -> StorageResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let mut removed = 0usize;

        for key in keys {
            let path = self.key_to_path(key)?;
            let sidecar = self.key_to_path(&name_sidecar_key(key))?;
            if self.remove_if_present(&path).await? {
                removed += 1;
            }
            self.remove_if_present(&sidecar).await?;
        }

        tracing::info!(
            requested = keys.len(),
            removed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn rename_object(&self, key: &str, new_name: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let sidecar = self.key_to_path(&name_sidecar_key(key))?;
        let mut file = fs::File::create(&sidecar).await.map_err(|e| {
            StorageError::RenameFailed(format!(
                "Failed to create {}: {}",
                sidecar.display(),
                e
            ))
        })?;
        file.write_all(new_name.as_bytes()).await.map_err(|e| {
            StorageError::RenameFailed(format!("Failed to write {}: {}", sidecar.display(), e))
        })?;
        file.sync_all().await?;

        tracing::debug!(key = %key, new_name = %new_name, "Local storage rename successful");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
