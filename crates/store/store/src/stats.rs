use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pantry_core::statistics;
use pantry_core::{
    ExpiredItemCount, MonthlyWaste, Statistics, StatusSplit, TOP_EXPIRED_LIMIT, UserId,
};

use crate::error::StoreError;
use crate::items::ItemStore;

/// Trait for per-owner statistics backends.
///
/// Implementations may use native SQL aggregation or fall back to in-memory
/// computation over the owner's items. Each method is an independent query:
/// the three reports of [`StatisticsStore::report`] may observe different
/// snapshots under concurrent writes.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn status_split(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<StatusSplit, StoreError>;

    /// Expired items per (year, month) of their expiry date, ascending, with
    /// no zero-count entries.
    async fn monthly_trend(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyWaste>, StoreError>;

    /// The `limit` most frequently expired names, count descending then
    /// name ascending.
    async fn top_expired(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ExpiredItemCount>, StoreError>;

    /// Run all three reports.
    async fn report(&self, owner: &UserId, now: DateTime<Utc>) -> Result<Statistics, StoreError> {
        Ok(Statistics {
            status_split: self.status_split(owner, now).await?,
            monthly_trend: self.monthly_trend(owner, now).await?,
            top_expired: self.top_expired(owner, now, TOP_EXPIRED_LIMIT).await?,
        })
    }
}

/// In-memory statistics implementation that works with any [`ItemStore`].
///
/// Every report re-fetches the owner's items and runs the pure aggregators
/// from `pantry_core::statistics`.
pub struct InMemoryStatistics<S: ItemStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ItemStore + ?Sized> InMemoryStatistics<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ItemStore + ?Sized + 'static> StatisticsStore for InMemoryStatistics<S> {
    async fn status_split(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<StatusSplit, StoreError> {
        let items = self.store.list_by_owner(owner).await?;
        Ok(statistics::status_split(&items, now))
    }

    async fn monthly_trend(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyWaste>, StoreError> {
        let items = self.store.list_by_owner(owner).await?;
        Ok(statistics::monthly_trend(&items, now))
    }

    async fn top_expired(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ExpiredItemCount>, StoreError> {
        let items = self.store.list_by_owner(owner).await?;
        tracing::debug!(owner = %owner, items = items.len(), "computing top expired in memory");
        Ok(statistics::top_expired(&items, now, limit))
    }
}
