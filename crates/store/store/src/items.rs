use std::sync::Arc;

use async_trait::async_trait;

use pantry_core::{Item, ItemId, ItemPatch, NewItem, UserId};

use crate::error::StoreError;
use crate::stats::StatisticsStore;

/// Trait for item persistence backends.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a new item, assigning its id and creation time.
    async fn insert(&self, item: NewItem) -> Result<Item, StoreError>;

    /// Fetch an item by id.
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// All items owned by `owner`, in creation order.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Item>, StoreError>;

    /// Apply a partial update. Returns `None` if the id is unknown.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, StoreError>;

    /// Remove an item. Returns the removed item, or `None` if the id is
    /// unknown.
    async fn delete(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Total number of stored items.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Return a native statistics store if the backend supports one.
    ///
    /// Backends with server-side aggregation override this. The default
    /// returns `None`, causing the caller to fall back to
    /// [`InMemoryStatistics`](crate::InMemoryStatistics).
    fn statistics(&self) -> Option<Arc<dyn StatisticsStore>> {
        None
    }
}
