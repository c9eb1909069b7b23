use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use pantry_core::{Dashboard, Item, ItemDraft, ItemId, ItemPatch, NewItem, Statistics, UserId};
use pantry_store::{ItemStore, StatisticsStore};

use crate::error::ServiceError;
use crate::metrics::ServiceMetrics;

/// The item-tracking operations exposed to the request layer.
///
/// Holds no domain state of its own: every call goes to the item store or
/// the statistics backend. Construct with
/// [`PantryServiceBuilder`](crate::PantryServiceBuilder).
pub struct PantryService {
    pub(crate) items: Arc<dyn ItemStore>,
    pub(crate) statistics: Arc<dyn StatisticsStore>,
    pub(crate) metrics: Arc<ServiceMetrics>,
}

impl PantryService {
    /// Store a validated item.
    #[instrument(name = "service.add_item", skip_all, fields(owner = %item.added_by()))]
    pub async fn add_item(&self, item: NewItem) -> Result<Item, ServiceError> {
        let item = self.observe(self.items.insert(item).await.map_err(Into::into))?;
        self.metrics.increment_items_added();
        info!(item_id = %item.id, "item added");
        Ok(item)
    }

    /// Validate raw wire fields and store the item.
    ///
    /// A missing or blank required field is rejected before the store is
    /// touched.
    pub async fn add_item_draft(&self, draft: ItemDraft) -> Result<Item, ServiceError> {
        let item = self.observe(draft.validate().map_err(Into::into))?;
        self.add_item(item).await
    }

    /// Apply a partial update to an existing item.
    #[instrument(name = "service.edit_item", skip(self, patch), fields(item_id = %id))]
    pub async fn edit_item(&self, id: ItemId, patch: &ItemPatch) -> Result<Item, ServiceError> {
        self.observe(patch.validate().map_err(Into::into))?;
        let updated = self.observe(self.items.update(id, patch).await.map_err(Into::into))?;
        let item = self.observe(updated.ok_or_else(item_not_found))?;
        self.metrics.increment_items_edited();
        info!("item edited");
        Ok(item)
    }

    #[instrument(name = "service.delete_item", skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, id: ItemId) -> Result<Item, ServiceError> {
        let removed = self.observe(self.items.delete(id).await.map_err(Into::into))?;
        let item = self.observe(removed.ok_or_else(item_not_found))?;
        self.metrics.increment_items_deleted();
        info!(owner = %item.added_by, "item deleted");
        Ok(item)
    }

    /// Fetch a single item, e.g. to check who owns it.
    pub async fn get_item(&self, id: ItemId) -> Result<Item, ServiceError> {
        let found = self.observe(self.items.get(id).await.map_err(Into::into))?;
        self.observe(found.ok_or_else(item_not_found))
    }

    /// Map the owner's item names to expiry dates.
    ///
    /// An owner with no items is `NotFound`, not an empty dashboard.
    #[instrument(name = "service.dashboard", skip(self), fields(%owner))]
    pub async fn dashboard(&self, owner: &UserId) -> Result<Dashboard, ServiceError> {
        let items = self.observe(self.items.list_by_owner(owner).await.map_err(Into::into))?;
        let dashboard = self.observe(
            Dashboard::build(&items).map_err(|e| ServiceError::NotFound(e.to_string())),
        )?;
        self.metrics.increment_dashboards();
        info!(entries = dashboard.len(), "dashboard built");
        Ok(dashboard)
    }

    /// Compute the owner's three waste reports against `now`.
    ///
    /// An owner with no items gets zero counts and empty lists.
    #[instrument(name = "service.statistics", skip(self), fields(%owner, %now))]
    pub async fn statistics(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Statistics, ServiceError> {
        let stats = self.observe(self.statistics.report(owner, now).await.map_err(Into::into))?;
        self.metrics.increment_statistics();
        info!(
            expired = stats.status_split.expired,
            active = stats.status_split.active,
            "statistics computed"
        );
        Ok(stats)
    }

    /// Total number of stored items.
    pub async fn item_count(&self) -> Result<u64, ServiceError> {
        self.observe(self.items.count().await.map_err(Into::into))
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Count failures by kind. Store failures are logged, never swallowed.
    fn observe<T>(&self, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        if let Err(err) = &result {
            match err {
                ServiceError::Validation(_) => self.metrics.increment_validation_failures(),
                ServiceError::NotFound(_) => self.metrics.increment_not_found(),
                ServiceError::Store(e) => {
                    self.metrics.increment_store_errors();
                    warn!(error = %e, "store operation failed");
                }
                ServiceError::Configuration(_) => {}
            }
        }
        result
    }
}

fn item_not_found() -> ServiceError {
    ServiceError::NotFound("item not found".into())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;

    use pantry_core::ValidationError;
    use pantry_store::StoreError;
    use pantry_store_memory::MemoryItemStore;

    use super::*;
    use crate::builder::PantryServiceBuilder;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn service() -> (PantryService, Arc<MemoryItemStore>) {
        let store = Arc::new(MemoryItemStore::new());
        let service = PantryServiceBuilder::new()
            .items(Arc::clone(&store) as Arc<dyn ItemStore>)
            .build()
            .unwrap();
        (service, store)
    }

    fn new_item(name: &str, expiry: DateTime<Utc>, owner: UserId) -> NewItem {
        NewItem::new(name, "Pantry", expiry, owner).unwrap()
    }

    #[tokio::test]
    async fn add_then_dashboard() {
        let (service, _) = service();
        let owner = UserId::new_v4();
        service
            .add_item(new_item("Milk", at(2024, 1, 10), owner))
            .await
            .unwrap();

        let dashboard = service.dashboard(&owner).await.unwrap();
        assert_eq!(dashboard.get("Milk"), Some(at(2024, 1, 10)));
        assert_eq!(service.metrics().snapshot().items_added, 1);
    }

    #[tokio::test]
    async fn draft_missing_expiry_leaves_store_untouched() {
        let (service, store) = service();
        let draft = ItemDraft {
            name: Some("Milk".into()),
            category: Some("Dairy".into()),
            user_id: Some(UserId::new_v4()),
            ..ItemDraft::default()
        };

        let err = service.add_item_draft(draft).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingField("expiryDate"))
        ));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(service.metrics().snapshot().validation_failures, 1);
    }

    #[tokio::test]
    async fn empty_edit_is_validation_error() {
        let (service, _) = service();
        let item = service
            .add_item(new_item("Milk", at(2024, 1, 10), UserId::new_v4()))
            .await
            .unwrap();

        let err = service
            .edit_item(item.id, &ItemPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyPatch)));
    }

    #[tokio::test]
    async fn edit_unknown_item_is_not_found() {
        let (service, _) = service();
        let patch = ItemPatch {
            name: Some("Bread".into()),
            ..ItemPatch::default()
        };
        let err = service
            .edit_item(ItemId::new_v4(), &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(service.metrics().snapshot().not_found, 1);
    }

    #[tokio::test]
    async fn edit_changes_only_supplied_fields() {
        let (service, _) = service();
        let owner = UserId::new_v4();
        let item = service
            .add_item(new_item("Milk", at(2024, 1, 10), owner))
            .await
            .unwrap();
        let patch = ItemPatch {
            expiry_date: Some(at(2024, 1, 20)),
            ..ItemPatch::default()
        };

        let edited = service.edit_item(item.id, &patch).await.unwrap();
        assert_eq!(edited.expiry_date, at(2024, 1, 20));
        assert_eq!(edited.name, "Milk");
        assert_eq!(edited.added_by, owner);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let (service, _) = service();
        let item = service
            .add_item(new_item("Milk", at(2024, 1, 10), UserId::new_v4()))
            .await
            .unwrap();

        let removed = service.delete_item(item.id).await.unwrap();
        assert_eq!(removed.id, item.id);
        assert!(matches!(
            service.delete_item(item.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.get_item(item.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn dashboard_without_items_is_not_found() {
        let (service, _) = service();
        let err = service.dashboard(&UserId::new_v4()).await.unwrap_err();
        match err {
            ServiceError::NotFound(msg) => assert_eq!(msg, "no items found for this user"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn statistics_without_items_is_zero() {
        let (service, _) = service();
        let stats = service
            .statistics(&UserId::new_v4(), at(2024, 2, 1))
            .await
            .unwrap();
        assert_eq!(stats, Statistics::default());
    }

    #[tokio::test]
    async fn statistics_scenario() {
        let (service, _) = service();
        let owner = UserId::new_v4();
        for (name, expiry) in [
            ("A", at(2024, 1, 10)),
            ("B", at(2024, 1, 20)),
            ("C", at(2030, 12, 1)),
        ] {
            service.add_item(new_item(name, expiry, owner)).await.unwrap();
        }

        let stats = service.statistics(&owner, at(2024, 2, 1)).await.unwrap();
        assert_eq!(stats.status_split.expired, 2);
        assert_eq!(stats.status_split.active, 1);
        assert_eq!(stats.monthly_trend.len(), 1);
        assert_eq!(stats.monthly_trend[0].expired_count, 2);
        let names: Vec<&str> = stats
            .top_expired
            .iter()
            .map(|e| e.item_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    struct BrokenStore;

    #[async_trait]
    impl ItemStore for BrokenStore {
        async fn insert(&self, _: NewItem) -> Result<Item, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn get(&self, _: ItemId) -> Result<Option<Item>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn list_by_owner(&self, _: &UserId) -> Result<Vec<Item>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn update(&self, _: ItemId, _: &ItemPatch) -> Result<Option<Item>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn delete(&self, _: ItemId) -> Result<Option<Item>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let service = PantryServiceBuilder::new()
            .items(Arc::new(BrokenStore))
            .build()
            .unwrap();
        let owner = UserId::new_v4();

        assert!(matches!(
            service.statistics(&owner, at(2024, 2, 1)).await,
            Err(ServiceError::Store(_))
        ));
        assert!(matches!(
            service.dashboard(&owner).await,
            Err(ServiceError::Store(_))
        ));
        assert_eq!(service.metrics().snapshot().store_errors, 2);
    }
}
