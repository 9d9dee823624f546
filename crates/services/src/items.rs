//! Item registration and catalogue queries.

use std::sync::Arc;

use domains::{
    AppError, Clock, Item, ItemFilter, ItemId, ItemRepository, ItemStatus, ItemUpdate, NewItem,
    Result, VerificationWindow,
};
use tracing::info;

use crate::atomic::update_item;

/// How many items the landing page shows.
pub const RECENT_LIMIT: usize = 8;

pub struct ItemService {
    repo: Arc<dyn ItemRepository>,
    clock: Arc<dyn Clock>,
    window: VerificationWindow,
}

impl ItemService {
    pub fn new(repo: Arc<dyn ItemRepository>, clock: Arc<dyn Clock>, window: VerificationWindow) -> Self {
        Self { repo, clock, window }
    }

    pub async fn create_item(&self, input: NewItem) -> Result<Item> {
        let item = Item::register(input, self.clock.now(), self.window)?;
        let saved = self.repo.save(&item).await?;
        info!(item_id = %saved.id, category = %saved.category, location = %saved.location, "item registered");
        Ok(saved)
    }

    pub async fn get_item(&self, id: ItemId) -> Result<Item> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::item_not_found(id))
    }

    /// Newest first. Delivered items are hidden unless asked for.
    pub async fn list_items(&self, include_delivered: bool) -> Result<Vec<Item>> {
        Ok(self.repo.find(&visible(include_delivered)).await?)
    }

    pub async fn recent_items(&self) -> Result<Vec<Item>> {
        let filter = ItemFilter {
            limit: Some(RECENT_LIMIT),
            ..ItemFilter::with_statuses([ItemStatus::Available])
        };
        Ok(self.repo.find(&filter).await?)
    }

    pub async fn search_items(&self, query: &str, include_delivered: bool) -> Result<Vec<Item>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("Search query is required"));
        }
        let filter = ItemFilter {
            search: Some(query.to_string()),
            ..visible(include_delivered)
        };
        Ok(self.repo.find(&filter).await?)
    }

    pub async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item> {
        let today = self.clock.now().date_naive();
        let (saved, ()) = update_item(self.repo.as_ref(), id, |item| {
            item.apply_update(update.clone(), today)
        })
        .await?;
        info!(item_id = %id, "item updated");
        Ok(saved)
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::item_not_found(id));
        }
        info!(item_id = %id, "item deleted");
        Ok(())
    }
}

fn visible(include_delivered: bool) -> ItemFilter {
    if include_delivered {
        ItemFilter::default()
    } else {
        ItemFilter::with_statuses([ItemStatus::Available, ItemStatus::Claimed])
    }
}
