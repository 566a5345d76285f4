use crate::keys::validate_key;
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process blob store for tests and single-node development.
///
/// Holds only the set of keys and their display names; blob bytes are never
/// transferred through this service.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<HashMap<String, Option<String>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob as uploaded
    pub async fn insert(&self, key: impl Into<String>) {
        self.objects.lock().await.insert(key.into(), None);
    }

    pub async fn display_name(&self, key: &str) -> Option<String> {
        self.objects.lock().await.get(key).cloned().flatten()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for MemoryStorage {
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            validate_key(key)?;
        }
        let mut objects = self.objects.lock().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn rename_object(&self, key: &str, new_name: &str) -> StorageResult<()> {
        validate_key(key)?;
        match self.objects.lock().await.get_mut(key) {
            Some(name) => {
                *name = Some(new_name.to_string());
                Ok(())
            }
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().await.contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
