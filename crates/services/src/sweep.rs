//! # Expiration Sweep
//!
//! One pass over every open item whose verification deadline has lapsed.
//! Claimed items lose their claims and go back to `available`; every
//! processed item gets a fresh window starting at `now`. Each claimant whose
//! claim was dropped is told so.
//!
//! Notifications go out only after the reset is persisted. If the save
//! fails the stored deadline is still stale, so the next sweep retries the
//! item and nobody is told about a reset that never happened.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    AppError, Claim, Item, ItemFilter, ItemRepository, Notification, Notifier, Result, StoreError,
    VerificationWindow,
};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::atomic::MAX_ATTEMPTS;
use crate::metrics::SweepMetrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Items the query returned.
    pub processed: usize,
    /// Claimed items whose claims were dropped.
    pub reset: usize,
    /// Claim-expired notifications delivered.
    pub notified: usize,
    /// Items that could not be updated this pass.
    pub failed: usize,
    pub notify_failed: usize,
}

pub struct ExpirationSweeper {
    repo: Arc<dyn ItemRepository>,
    notifier: Arc<dyn Notifier>,
    window: VerificationWindow,
    metrics: SweepMetrics,
}

impl ExpirationSweeper {
    pub fn new(
        repo: Arc<dyn ItemRepository>,
        notifier: Arc<dyn Notifier>,
        window: VerificationWindow,
    ) -> Self {
        Self {
            repo,
            notifier,
            window,
            metrics: SweepMetrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: SweepMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Runs one sweep as of `now`. Never fails: per-item problems are
    /// logged and counted in the report.
    pub async fn run(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let candidates = match self.repo.find(&ItemFilter::expired_as_of(now)).await {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "expiration sweep could not query items");
                self.metrics.store_failures.inc();
                self.metrics.record(&report);
                return report;
            }
        };

        let mut sends = JoinSet::new();
        for item in candidates {
            report.processed += 1;
            let item_id = item.id;

            match self.reset_item(item, now).await {
                Ok(Some((saved, expired))) => {
                    if !expired.is_empty() {
                        report.reset += 1;
                        info!(item_id = %item_id, claims = expired.len(), "expired claims reset");
                    }
                    for claim in &expired {
                        let notification = Notification::claim_expired(&saved, claim);
                        let notifier = Arc::clone(&self.notifier);
                        sends.spawn(async move {
                            let recipient = notification.recipient().to_string();
                            notifier.send(notification).await.map_err(|err| (recipient, err))
                        });
                    }
                }
                Ok(None) => debug!(item_id = %item_id, "item no longer expired, skipped"),
                Err(err) => {
                    report.failed += 1;
                    warn!(item_id = %item_id, error = %err, "failed to reset expired item");
                }
            }
        }

        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok(Ok(())) => report.notified += 1,
                Ok(Err((recipient, err))) => {
                    report.notify_failed += 1;
                    warn!(recipient = %recipient, error = %err, "claim-expired notification failed");
                }
                Err(err) => {
                    report.notify_failed += 1;
                    warn!(error = %err, "notification task aborted");
                }
            }
        }

        self.metrics.record(&report);
        report
    }

    /// Resets one item with a version check. `Ok(None)` means the item
    /// stopped being eligible (delivered, deleted or already reset) before
    /// we got to write it.
    async fn reset_item(&self, mut item: Item, now: DateTime<Utc>) -> Result<Option<(Item, Vec<Claim>)>> {
        let id = item.id;
        for _ in 0..MAX_ATTEMPTS {
            if !item.is_expired(now) {
                return Ok(None);
            }
            let expired = item.expire_claims(now, self.window);

            match self.repo.save(&item).await {
                Ok(saved) => return Ok(Some((saved, expired))),
                Err(StoreError::VersionConflict { .. }) => match self.repo.get(id).await? {
                    Some(fresh) => item = fresh,
                    None => return Ok(None),
                },
                Err(err) => return Err(err.into()),
            }
        }
        Err(AppError::Conflict(format!(
            "item {id} kept changing during the sweep"
        )))
    }
}
