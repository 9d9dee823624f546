//! Claim submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    AppError, Claim, ClaimId, ClaimantIdentity, Clock, ItemId, ItemRepository, Notification, Notifier,
    Result, VerificationWindow,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::atomic::update_item;

/// What a claimant gets back: which claim was recorded and when to show up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceipt {
    pub item_id: ItemId,
    pub claim_id: ClaimId,
    pub verification_deadline: DateTime<Utc>,
}

pub struct ClaimService {
    repo: Arc<dyn ItemRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    window: VerificationWindow,
}

impl ClaimService {
    pub fn new(
        repo: Arc<dyn ItemRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        window: VerificationWindow,
    ) -> Self {
        Self {
            repo,
            notifier,
            clock,
            window,
        }
    }

    /// Appends the claim and tells the claimant their verification deadline.
    ///
    /// A missing item is `NotFound` and a delivered one `InvalidState`
    /// whatever the identity holds; only then is the identity validated.
    /// A failed notification is logged; the claim stands.
    pub async fn submit_claim(&self, item_id: ItemId, identity: ClaimantIdentity) -> Result<ClaimReceipt> {
        let claim_id = ClaimId::new();
        let claimed_at = self.clock.now();

        let window = self.window;
        let (item, (deadline, claim)) = update_item(self.repo.as_ref(), item_id, |item| {
            let deadline = item.add_claim(
                Claim {
                    id: claim_id,
                    identity: identity.clone(),
                    claimed_at,
                },
                window,
            )?;
            let stored = item
                .claims()
                .iter()
                .find(|c| c.id == claim_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("claim {claim_id} missing after append")))?;
            Ok((deadline, stored))
        })
        .await?;

        info!(
            item_id = %item_id,
            claim_id = %claim.id,
            role = %claim.identity.role(),
            claims = item.claims().len(),
            "claim recorded"
        );

        let notification = Notification::claim_received(&item, &claim, deadline);
        if let Err(err) = self.notifier.send(notification).await {
            warn!(item_id = %item_id, claim_id = %claim.id, error = %err, "claim confirmation not sent");
        }

        Ok(ClaimReceipt {
            item_id,
            claim_id: claim.id,
            verification_deadline: deadline,
        })
    }
}
