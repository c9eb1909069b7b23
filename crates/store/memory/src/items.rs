use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use pantry_core::{Item, ItemId, ItemPatch, NewItem, UserId};
use pantry_store::{ItemStore, StoreError};

/// In-memory item store backed by [`DashMap`].
///
/// Keeps a per-owner index of ids in insertion order so that
/// [`ItemStore::list_by_owner`] returns items in creation order.
#[derive(Default)]
pub struct MemoryItemStore {
    items: DashMap<ItemId, Item>,
    by_owner: DashMap<UserId, Vec<ItemId>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, item: NewItem) -> Result<Item, StoreError> {
        let item = Item::from_new(item, ItemId::new_v4(), Utc::now());
        self.items.insert(item.id, item.clone());
        self.by_owner.entry(item.added_by).or_default().push(item.id);
        Ok(item)
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Item>, StoreError> {
        let ids = match self.by_owner.get(owner) {
            Some(ids) => ids.value().clone(),
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, StoreError> {
        Ok(self.items.get_mut(&id).map(|mut entry| {
            patch.apply(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let Some((_, item)) = self.items.remove(&id) else {
            return Ok(None);
        };
        if let Some(mut ids) = self.by_owner.get_mut(&item.added_by) {
            ids.retain(|existing| *existing != id);
        }
        Ok(Some(item))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.items.len() as u64)
    }
}
