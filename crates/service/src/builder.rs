use std::sync::Arc;

use pantry_store::{InMemoryStatistics, ItemStore, StatisticsStore};

use crate::error::ServiceError;
use crate::metrics::ServiceMetrics;
use crate::service::PantryService;

/// Fluent builder for constructing a [`PantryService`].
///
/// An [`ItemStore`] is required. The statistics backend defaults to the
/// store's native one, or to [`InMemoryStatistics`] over the item store when
/// it has none.
#[derive(Default)]
pub struct PantryServiceBuilder {
    items: Option<Arc<dyn ItemStore>>,
    statistics: Option<Arc<dyn StatisticsStore>>,
    metrics: Option<Arc<ServiceMetrics>>,
}

impl PantryServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(mut self, store: Arc<dyn ItemStore>) -> Self {
        self.items = Some(store);
        self
    }

    /// Override the statistics backend.
    #[must_use]
    pub fn statistics(mut self, store: Arc<dyn StatisticsStore>) -> Self {
        self.statistics = Some(store);
        self
    }

    /// Share an existing set of counters.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<PantryService, ServiceError> {
        let items = self
            .items
            .ok_or_else(|| ServiceError::Configuration("item store is required".into()))?;

        let statistics = self
            .statistics
            .or_else(|| items.statistics())
            .unwrap_or_else(|| {
                Arc::new(InMemoryStatistics::new(Arc::clone(&items))) as Arc<dyn StatisticsStore>
            });

        Ok(PantryService {
            items,
            statistics,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_store_memory::MemoryItemStore;

    #[test]
    fn build_missing_items_returns_error() {
        let result = PantryServiceBuilder::new().build();
        let err = result.err().expect("build should fail");
        assert!(err.to_string().contains("item store is required"));
    }

    #[test]
    fn build_with_item_store_succeeds() {
        let store = Arc::new(MemoryItemStore::new());
        let result = PantryServiceBuilder::new().items(store).build();
        assert!(result.is_ok());
    }

    #[test]
    fn shares_supplied_metrics() {
        let metrics = Arc::new(ServiceMetrics::default());
        let service = PantryServiceBuilder::new()
            .items(Arc::new(MemoryItemStore::new()))
            .metrics(Arc::clone(&metrics))
            .build()
            .unwrap();
        metrics.increment_dashboards();
        assert_eq!(service.metrics().snapshot().dashboards, 1);
    }
}
