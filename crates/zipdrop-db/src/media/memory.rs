use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use zipdrop_core::MediaRecord;

use super::{MediaChanges, MediaFilter, MediaInsert, MediaOrder, MediaStore};
use crate::error::StoreError;

#[derive(Default)]
struct MediaTable {
    rows: HashMap<String, MediaRecord>,
    /// Last id handed out. Never decremented, so deleted ids are not reused.
    last_id: i64,
}

/// In-process metadata store keyed by blob key
#[derive(Clone, Default)]
pub struct MemoryMediaStore {
    table: Arc<Mutex<MediaTable>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record as-is, for seeding fixtures with arbitrary timestamps.
    pub async fn seed(&self, record: MediaRecord) {
        let mut table = self.table.lock().await;
        table.last_id = table.last_id.max(record.id);
        table.rows.insert(record.key.clone(), record);
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn insert(&self, fields: MediaInsert) -> Result<MediaRecord, StoreError> {
        let mut table = self.table.lock().await;
        if table.rows.contains_key(&fields.key) {
            return Err(StoreError::Conflict(format!(
                "media with key '{}' already exists",
                fields.key
            )));
        }

        table.last_id += 1;
        let record = MediaRecord {
            id: table.last_id,
            key: fields.key,
            name: fields.name,
            size: fields.size,
            owner_id: fields.owner_id,
            visibility: fields.visibility,
            to_be_deleted: false,
            created_at: fields.created_at,
            updated_at: fields.created_at,
        };
        table.rows.insert(record.key.clone(), record.clone());
        Ok(record)
    }

    async fn update_by_key(
        &self,
        key: &str,
        changes: MediaChanges,
    ) -> Result<Option<MediaRecord>, StoreError> {
        let mut table = self.table.lock().await;
        Ok(table.rows.get_mut(key).map(|record| {
            record.name = changes.name;
            record.size = changes.size;
            record.visibility = changes.visibility;
            record.updated_at = changes.updated_at;
            record.clone()
        }))
    }

    async fn delete_by_key(&self, key: &str) -> Result<Option<MediaRecord>, StoreError> {
        Ok(self.table.lock().await.rows.remove(key))
    }

    async fn find_many(
        &self,
        filter: MediaFilter,
        order: MediaOrder,
    ) -> Result<Vec<MediaRecord>, StoreError> {
        let table = self.table.lock().await;
        let mut records: Vec<MediaRecord> = table
            .rows
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        match order {
            MediaOrder::UpdatedAtDesc => records.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            MediaOrder::CreatedAtAsc => records.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        Ok(records)
    }

    async fn mark_for_deletion(&self, key: &str) -> Result<bool, StoreError> {
        let mut table = self.table.lock().await;
        Ok(match table.rows.get_mut(key) {
            Some(record) => {
                record.to_be_deleted = true;
                true
            }
            None => false,
        })
    }
}
