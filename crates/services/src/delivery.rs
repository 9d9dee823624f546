//! Delivery of a claimed item to one of its claimants.

use std::sync::Arc;

use domains::{ClaimSelector, Clock, DeliveryRecord, ItemId, ItemRepository, Result};
use tracing::info;

use crate::atomic::update_item;

pub struct DeliveryService {
    repo: Arc<dyn ItemRepository>,
    clock: Arc<dyn Clock>,
}

impl DeliveryService {
    pub fn new(repo: Arc<dyn ItemRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Records the hand-over to the selected claimant. Unselected claimants
    /// are dropped without a notification.
    pub async fn deliver(
        &self,
        item_id: ItemId,
        selector: ClaimSelector,
        verified_by: Option<String>,
    ) -> Result<DeliveryRecord> {
        let now = self.clock.now();
        let (_, record) = update_item(self.repo.as_ref(), item_id, |item| {
            item.deliver(selector, verified_by.clone(), now)
        })
        .await?;

        info!(
            item_id = %item_id,
            claim_id = %record.claim_id,
            verified_by = %record.verified_by,
            "item delivered"
        );
        Ok(record)
    }
}
