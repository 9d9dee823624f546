//! Outbound messages sent to claimants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::identity::ClaimantRole;
use crate::models::{Category, Claim, Item, ItemId, Location};

/// Confirms a claim was recorded and tells the claimant when to show up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceived {
    pub recipient: String,
    pub claimant_name: String,
    pub role: ClaimantRole,
    pub item_id: ItemId,
    pub item_name: String,
    pub found_location: Location,
    pub verification_deadline: DateTime<Utc>,
}

/// Tells a claimant their claim lapsed because nobody came to verify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimExpired {
    pub recipient: String,
    pub claimant_name: String,
    pub item_id: ItemId,
    pub item_name: String,
    pub category: Category,
    pub location: Location,
    pub found_date: NaiveDate,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ClaimReceived(ClaimReceived),
    ClaimExpired(ClaimExpired),
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::ClaimReceived(n) => &n.recipient,
            Notification::ClaimExpired(n) => &n.recipient,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ClaimReceived(_) => "claim_received",
            Notification::ClaimExpired(_) => "claim_expired",
        }
    }

    pub fn item_id(&self) -> ItemId {
        match self {
            Notification::ClaimReceived(n) => n.item_id,
            Notification::ClaimExpired(n) => n.item_id,
        }
    }

    pub fn claim_received(item: &Item, claim: &Claim, deadline: DateTime<Utc>) -> Self {
        Notification::ClaimReceived(ClaimReceived {
            recipient: claim.identity.email().to_string(),
            claimant_name: claim.identity.display_name().to_string(),
            role: claim.identity.role(),
            item_id: item.id,
            item_name: item.name.clone(),
            found_location: item.location,
            verification_deadline: deadline,
        })
    }

    pub fn claim_expired(item: &Item, claim: &Claim) -> Self {
        Notification::ClaimExpired(ClaimExpired {
            recipient: claim.identity.email().to_string(),
            claimant_name: claim.identity.display_name().to_string(),
            item_id: item.id,
            item_name: item.name.clone(),
            category: item.category,
            location: item.location,
            found_date: item.found_date,
            claimed_at: claim.claimed_at,
        })
    }
}
