use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use zipdrop_core::MediaRecord;

use super::{MediaChanges, MediaFilter, MediaInsert, MediaOrder, MediaStore};
use crate::error::StoreError;

const MEDIA_COLUMNS: &str =
    "id, key, name, size, owner_id, visibility, to_be_deleted, created_at, updated_at";

/// Metadata store over the `media` table
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    #[tracing::instrument(skip(self, fields), fields(db.table = "media", db.operation = "insert", media.key = %fields.key))]
    async fn insert(&self, fields: MediaInsert) -> Result<MediaRecord, StoreError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            r#"
            INSERT INTO media (key, name, size, owner_id, visibility, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(&fields.key)
        .bind(&fields.name)
        .bind(fields.size)
        .bind(&fields.owner_id)
        .bind(fields.visibility)
        .bind(fields.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "media", db.operation = "update"))]
    async fn update_by_key(
        &self,
        key: &str,
        changes: MediaChanges,
    ) -> Result<Option<MediaRecord>, StoreError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            r#"
            UPDATE media
            SET name = $2, size = $3, visibility = $4, updated_at = $5
            WHERE key = $1
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(key)
        .bind(&changes.name)
        .bind(changes.size)
        .bind(changes.visibility)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete"))]
    async fn delete_by_key(&self, key: &str) -> Result<Option<MediaRecord>, StoreError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            "DELETE FROM media WHERE key = $1 RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn find_many(
        &self,
        filter: MediaFilter,
        order: MediaOrder,
    ) -> Result<Vec<MediaRecord>, StoreError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MEDIA_COLUMNS} FROM media WHERE TRUE"));

        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id);
        }
        if let Some(key) = filter.key {
            query.push(" AND key = ").push_bind(key);
        }
        if let Some(owner_id) = filter.owner_id {
            query.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(visibility) = filter.visibility {
            query.push(" AND visibility = ").push_bind(visibility);
        }
        if filter.exclude_marked {
            query.push(" AND to_be_deleted = FALSE");
        }

        query.push(match order {
            MediaOrder::UpdatedAtDesc => " ORDER BY updated_at DESC, id DESC",
            MediaOrder::CreatedAtAsc => " ORDER BY created_at ASC, id ASC",
        });

        let records = query
            .build_query_as::<MediaRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "mark"))]
    async fn mark_for_deletion(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query::<Postgres>("UPDATE media SET to_be_deleted = TRUE WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
