use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pantry_core::{ExpiredItemCount, MonthlyWaste, StatusSplit, UserId};
use pantry_store::{StatisticsStore, StoreError};

use crate::pool::map_query_error;

/// Native statistics backed by `GROUP BY` queries.
///
/// Created via `statistics()` on [`PostgresItemStore`](crate::PostgresItemStore);
/// shares the same pool. Names are ranked with `COLLATE "C"` so ties break in
/// byte order, matching the in-memory ranking.
pub struct PostgresStatisticsStore {
    pool: PgPool,
    table: String,
}

impl PostgresStatisticsStore {
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }
}

#[derive(sqlx::FromRow)]
struct SplitRow {
    expired: i64,
    active: i64,
}

#[derive(sqlx::FromRow)]
struct MonthRow {
    year: i32,
    month: i32,
    cnt: i64,
}

#[derive(sqlx::FromRow)]
struct TopRow {
    name: String,
    cnt: i64,
}

#[allow(clippy::cast_sign_loss)]
fn to_count(cnt: i64) -> u64 {
    cnt.max(0) as u64
}

#[async_trait]
impl StatisticsStore for PostgresStatisticsStore {
    async fn status_split(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<StatusSplit, StoreError> {
        let sql = format!(
            "SELECT
                COUNT(*) FILTER (WHERE expiry_date < $2) AS expired,
                COUNT(*) FILTER (WHERE expiry_date >= $2) AS active
            FROM {}
            WHERE added_by = $1",
            self.table
        );

        let row = sqlx::query_as::<_, SplitRow>(&sql)
            .bind(owner.as_uuid())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(StatusSplit {
            expired: to_count(row.expired),
            active: to_count(row.active),
        })
    }

    async fn monthly_trend(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyWaste>, StoreError> {
        let sql = format!(
            "SELECT
                EXTRACT(YEAR FROM expiry_date AT TIME ZONE 'UTC')::INT4 AS year,
                EXTRACT(MONTH FROM expiry_date AT TIME ZONE 'UTC')::INT4 AS month,
                COUNT(*) AS cnt
            FROM {}
            WHERE added_by = $1 AND expiry_date < $2
            GROUP BY 1, 2
            ORDER BY 1, 2",
            self.table
        );

        let rows = sqlx::query_as::<_, MonthRow>(&sql)
            .bind(owner.as_uuid())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        rows.into_iter()
            .map(|row| {
                let month = u32::try_from(row.month)
                    .map_err(|e| StoreError::Serialization(format!("month {}: {e}", row.month)))?;
                Ok(MonthlyWaste {
                    year: row.year,
                    month,
                    expired_count: to_count(row.cnt),
                })
            })
            .collect()
    }

    async fn top_expired(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ExpiredItemCount>, StoreError> {
        let sql = format!(
            "SELECT name, COUNT(*) AS cnt
            FROM {}
            WHERE added_by = $1 AND expiry_date < $2
            GROUP BY name
            ORDER BY cnt DESC, name COLLATE \"C\" ASC
            LIMIT $3",
            self.table
        );

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, TopRow>(&sql)
            .bind(owner.as_uuid())
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ExpiredItemCount {
                item_name: row.name,
                count: to_count(row.cnt),
            })
            .collect())
    }
}
