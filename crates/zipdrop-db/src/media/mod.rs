//! Media metadata store

mod memory;
mod postgres;

pub use memory::MemoryMediaStore;
pub use postgres::PgMediaStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use zipdrop_core::{MediaRecord, Visibility};

use crate::error::StoreError;

/// Fields of a new row. Timestamps come from the caller's clock.
#[derive(Debug, Clone)]
pub struct MediaInsert {
    pub key: String,
    pub name: String,
    pub size: i64,
    pub owner_id: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Mutable fields written by an edit
#[derive(Debug, Clone)]
pub struct MediaChanges {
    pub name: String,
    pub size: i64,
    pub visibility: Visibility,
    pub updated_at: DateTime<Utc>,
}

/// Conjunctive filter for [`MediaStore::find_many`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub id: Option<i64>,
    pub key: Option<String>,
    pub owner_id: Option<String>,
    pub visibility: Option<Visibility>,
    /// Skip rows flagged `to_be_deleted`
    pub exclude_marked: bool,
}

impl MediaFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn by_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &MediaRecord) -> bool {
        self.id.map_or(true, |id| record.id == id)
            && self.key.as_deref().map_or(true, |k| record.key == k)
            && self.owner_id.as_deref().map_or(true, |o| record.owner_id == o)
            && self.visibility.map_or(true, |v| record.visibility == v)
            && !(self.exclude_marked && record.to_be_deleted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaOrder {
    /// Most recently changed first; ties broken by id descending
    #[default]
    UpdatedAtDesc,
    /// Oldest first; ties broken by id ascending
    CreatedAtAsc,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert(&self, fields: MediaInsert) -> Result<MediaRecord, StoreError>;

    /// `None` when no row has this key.
    async fn update_by_key(
        &self,
        key: &str,
        changes: MediaChanges,
    ) -> Result<Option<MediaRecord>, StoreError>;

    /// Returns the deleted row, or `None` when it was already gone.
    async fn delete_by_key(&self, key: &str) -> Result<Option<MediaRecord>, StoreError>;

    async fn find_many(
        &self,
        filter: MediaFilter,
        order: MediaOrder,
    ) -> Result<Vec<MediaRecord>, StoreError>;

    /// Flag the row as being removed. Returns false when no row has this key.
    async fn mark_for_deletion(&self, key: &str) -> Result<bool, StoreError>;
}
