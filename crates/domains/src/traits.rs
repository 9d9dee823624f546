//! # Core Traits (Ports)
//!
//! Storage and notification backends implement these traits; the services
//! only ever see `Arc<dyn ItemRepository>` and `Arc<dyn Notifier>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{NotifyError, StoreError};
use crate::models::{Item, ItemId, ItemStatus};
use crate::notification::Notification;

/// Selection criteria for `ItemRepository::find`. Every field narrows the
/// result; the default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Empty means any status.
    pub statuses: Vec<ItemStatus>,
    /// Only items whose deadline is strictly before this instant.
    pub deadline_before: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ItemFilter {
    /// Open items whose verification window lapsed before `now`.
    pub fn expired_as_of(now: DateTime<Utc>) -> Self {
        Self {
            statuses: vec![ItemStatus::Available, ItemStatus::Claimed],
            deadline_before: Some(now),
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = ItemStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&item.status()) {
            return false;
        }
        if let Some(before) = self.deadline_before {
            match item.verification_deadline() {
                Some(deadline) if deadline < before => {}
                _ => return false,
            }
        }
        if let Some(needle) = self.search.as_deref() {
            if !item.matches_text(needle) {
                return false;
            }
        }
        true
    }
}

/// Durable item storage.
///
/// `save` is a compare-and-swap on `Item::version`: version 0 inserts a new
/// item, anything else must match the stored version. The stored copy (with
/// its bumped version) is returned.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Matching items, newest first.
    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError>;

    async fn save(&self, item: &Item) -> Result<Item, StoreError>;

    /// Returns false when there was nothing to delete.
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError>;
}

/// Outbound delivery of claimant notifications (email in production).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}
