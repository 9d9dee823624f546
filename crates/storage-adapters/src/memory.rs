//! # In-memory item store
//!
//! Backs development runs and tests. Each save takes the shard lock for the
//! item's key, so the version check and the write happen atomically.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{Item, ItemFilter, ItemId, ItemRepository, StoreError};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: DashMap<ItemId, Item>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Newest first; the id breaks ties between items created in the same instant.
pub(crate) fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
        let mut found: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut found);
        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn save(&self, item: &Item) -> Result<Item, StoreError> {
        let conflict = || StoreError::VersionConflict {
            id: item.id,
            expected: item.version,
        };

        let mut stored = item.clone();
        stored.version = item.version + 1;

        match self.items.entry(item.id) {
            Entry::Vacant(slot) if item.version == 0 => {
                slot.insert(stored.clone());
            }
            Entry::Occupied(mut slot) if item.version != 0 && slot.get().version == item.version => {
                slot.insert(stored.clone());
            }
            _ => {
                debug!(item_id = %item.id, expected = item.version, "stale save rejected");
                return Err(conflict());
            }
        }
        Ok(stored)
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        Ok(self.items.remove(&id).is_some())
    }
}
