use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pantry_core::{Item, ItemId, ItemPatch, NewItem, UserId};
use pantry_store::{ItemStore, StatisticsStore, StoreError};

use crate::config::PostgresConfig;
use crate::pool::map_query_error;
use crate::stats::PostgresStatisticsStore;

/// PostgreSQL-backed implementation of [`ItemStore`].
///
/// Creation order is `(created_at, id)`. Statistics are computed natively
/// by a [`PostgresStatisticsStore`] sharing the same pool.
pub struct PostgresItemStore {
    pool: PgPool,
    table: String,
    statistics: Arc<PostgresStatisticsStore>,
}

impl PostgresItemStore {
    /// Create a store over an existing, migrated pool.
    pub fn from_pool(pool: PgPool, config: &PostgresConfig) -> Self {
        let table = config.items_table();
        let statistics = Arc::new(PostgresStatisticsStore::new(pool.clone(), table.clone()));
        Self {
            pool,
            table,
            statistics,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    category: String,
    expiry_date: DateTime<Utc>,
    notes: String,
    added_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            expiry_date: row.expiry_date,
            notes: row.notes,
            added_by: UserId::from_uuid(row.added_by),
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, name, category, expiry_date, notes, added_by, created_at";

#[async_trait]
impl ItemStore for PostgresItemStore {
    async fn insert(&self, item: NewItem) -> Result<Item, StoreError> {
        let item = Item::from_new(item, ItemId::new_v4(), Utc::now());
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}",
            self.table
        );

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(item.id.as_uuid())
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.expiry_date)
            .bind(&item.notes)
            .bind(item.added_by.as_uuid())
            .bind(item.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.into())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.table);

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE added_by = $1 ORDER BY created_at, id",
            self.table
        );

        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, StoreError> {
        let sql = format!(
            "UPDATE {} SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                expiry_date = COALESCE($4, expiry_date),
                notes = COALESCE($5, notes)
            WHERE id = $1
            RETURNING {COLUMNS}",
            self.table
        );

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id.as_uuid())
            .bind(patch.name.as_deref())
            .bind(patch.category.as_deref())
            .bind(patch.expiry_date)
            .bind(patch.notes.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {COLUMNS}", self.table);

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);

        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        #[allow(clippy::cast_sign_loss)]
        let total = total as u64;
        Ok(total)
    }

    fn statistics(&self) -> Option<Arc<dyn StatisticsStore>> {
        Some(Arc::clone(&self.statistics) as Arc<dyn StatisticsStore>)
    }
}
