//! # Domain Models
//!
//! These structs represent the core entities of the lost-and-found portal.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! `Item` keeps its lifecycle fields private: every transition goes through a
//! method that upholds the invariants
//! - `claims` is non-empty iff status is `claimed`
//! - `delivery_record` is present iff status is `delivered`

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::identity::ClaimantIdentity;
use crate::validation::{parse_found_date, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use crate::window::{has_lapsed, VerificationWindow};

/// Default attribution when a guard records a delivery without naming themselves.
pub const DEFAULT_VERIFIER: &str = "guard";

/// Default `added_by` for items logged without an authenticated guard.
pub const DEFAULT_ADDED_BY: &str = "pict_guard";

// ── Identifiers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AppError::validation(format!("'{s}' is not a valid item id")))
    }
}

/// Stable per-claim identifier, so a guard can pick a claim without relying
/// on its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(Uuid);

impl ClaimId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Claimed,
    Delivered,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $err:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| AppError::validation($err))
            }
        }
    };
}

labelled_enum!(
    /// What kind of thing was found.
    Category, "Please select a category" {
        Electronics => "Electronics",
        Clothing => "Clothing",
        StudyMaterial => "Study Material",
        Accessories => "Accessories",
        IdCards => "ID Cards",
        Keys => "Keys",
        Other => "Other",
    }
);

labelled_enum!(
    /// Where on campus the item was found.
    Location, "Please select a location" {
        EntryGate => "Entry gate",
        F1Building => "F1 Building",
        A1Building => "A1 Building",
        A2Building => "A2 Building",
        A3Building => "A3 Building",
        CanteenArea => "Canteen Area",
        Library => "Library",
        ReadingHall => "Reading Hall",
        ComputerLab => "Computer Lab",
        Auditorium => "Auditorium",
        CollegeGym => "College GYM",
        TableTennisRoom => "Table Tennis Room",
        ParkingLot => "Parking Lot",
        BoysHostel => "Boys Hostel",
        GirlsHostel => "Girls Hostel",
        PlayGround => "Play Ground",
        StudentCounter => "Student Counter",
        GreenLawn => "Green Lawn",
        MainBuilding => "Main Building",
        SportsField => "Sports Field",
        Other => "Other",
    }
);

// ── Claims & deliveries ──────────────────────────────────────────────────────

/// One person's assertion of ownership. Only ever lives inside an `Item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    #[serde(flatten)]
    pub identity: ClaimantIdentity,
    pub claimed_at: DateTime<Utc>,
}

/// Immutable snapshot of who received an item and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub claim_id: ClaimId,
    #[serde(flatten)]
    pub recipient: ClaimantIdentity,
    pub claimed_at: DateTime<Utc>,
    pub delivered_at: DateTime<Utc>,
    pub verified_by: String,
}

/// How a guard picks the claimant who gets the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSelector {
    /// Position in the claims list at the time of delivery.
    Index(usize),
    Id(ClaimId),
}

impl fmt::Display for ClaimSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimSelector::Index(i) => write!(f, "index {i}"),
            ClaimSelector::Id(id) => id.fmt(f),
        }
    }
}

// ── Item ─────────────────────────────────────────────────────────────────────

/// Raw item registration as submitted by a guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub location: String,
    /// URL handed back by the external image store.
    pub image_url: String,
    pub found_date: String,
    pub added_by: Option<String>,
}

/// Partial edit of an `available` item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub found_date: Option<String>,
}

/// A found physical object and its place in the claim lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub location: Location,
    pub image_url: String,
    pub found_date: NaiveDate,
    pub added_by: String,
    created_at: DateTime<Utc>,
    verification_deadline: Option<DateTime<Utc>>,
    status: ItemStatus,
    #[serde(default)]
    claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivery_record: Option<DeliveryRecord>,
    /// Optimistic-concurrency counter, bumped by the store on every save.
    #[serde(default)]
    pub version: u64,
}

impl Item {
    /// Validates a registration and builds a fresh `available` item whose
    /// verification window opens at `created_at`.
    pub fn register(
        input: NewItem,
        created_at: DateTime<Utc>,
        window: VerificationWindow,
    ) -> Result<Self> {
        let today = created_at.date_naive();
        let name = checked_name(&input.name)?;
        let description = checked_description(input.description)?;
        let category = input.category.parse::<Category>()?;
        let location = input.location.parse::<Location>()?;
        let image_url = checked_image_url(&input.image_url)?;
        let found_date = parse_found_date(&input.found_date, today)?;
        let added_by = input
            .added_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDED_BY.to_string());

        Ok(Self {
            id: ItemId::new(),
            name,
            description,
            category,
            location,
            image_url,
            found_date,
            added_by,
            created_at,
            verification_deadline: Some(window.compute_deadline(created_at)),
            status: ItemStatus::Available,
            claims: Vec::new(),
            delivery_record: None,
            version: 0,
        })
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn delivery_record(&self) -> Option<&DeliveryRecord> {
        self.delivery_record.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn verification_deadline(&self) -> Option<DateTime<Utc>> {
        self.verification_deadline
    }

    /// True when the item is still open and its deadline is strictly past `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status != ItemStatus::Delivered
            && self
                .verification_deadline
                .is_some_and(|deadline| has_lapsed(deadline, now))
    }

    /// Checks the status/claims/delivery invariants. Stores call this on
    /// documents they load so a corrupt record never reaches the services.
    pub fn check_invariants(&self) -> Result<()> {
        let ok = match self.status {
            ItemStatus::Available => self.claims.is_empty() && self.delivery_record.is_none(),
            ItemStatus::Claimed => !self.claims.is_empty() && self.delivery_record.is_none(),
            ItemStatus::Delivered => self.claims.is_empty() && self.delivery_record.is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(AppError::Internal(format!(
                "item {} violates lifecycle invariants (status {}, {} claims, delivery record {})",
                self.id,
                self.status,
                self.claims.len(),
                self.delivery_record.is_some()
            )))
        }
    }

    /// Appends a claim and returns the verification deadline all claimants share.
    ///
    /// A delivered item refuses every claim before the identity is looked at.
    /// The stored claim carries the normalized identity. The first claim moves
    /// the item to `claimed`. A deadline is stamped from `created_at` only when
    /// the item has none; later claims never move it.
    pub fn add_claim(
        &mut self,
        claim: Claim,
        window: VerificationWindow,
    ) -> Result<DateTime<Utc>> {
        if self.status == ItemStatus::Delivered {
            return Err(AppError::invalid_state(
                "This item has already been delivered and cannot be claimed",
            ));
        }
        let claim = Claim {
            identity: claim.identity.validated()?,
            ..claim
        };

        let key = claim.identity.key();
        if self.claims.iter().any(|c| c.identity.key() == key) {
            return Err(AppError::DuplicateClaim(
                "You have already claimed this item".to_string(),
            ));
        }

        self.claims.push(claim);
        self.status = ItemStatus::Claimed;
        let deadline = *self
            .verification_deadline
            .get_or_insert_with(|| window.compute_deadline(self.created_at));
        Ok(deadline)
    }

    /// `InvalidState` unless the item is `claimed`.
    pub fn ensure_deliverable(&self) -> Result<()> {
        if self.status != ItemStatus::Claimed {
            return Err(AppError::invalid_state(format!(
                "Only claimed items can be delivered (item is {})",
                self.status
            )));
        }
        Ok(())
    }

    /// Hands the item to the selected claimant. Terminal.
    ///
    /// The other claims are dropped; they are not kept anywhere retrievable.
    pub fn deliver(
        &mut self,
        selector: ClaimSelector,
        verified_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<DeliveryRecord> {
        self.ensure_deliverable()?;

        let position = match selector {
            ClaimSelector::Index(i) if i < self.claims.len() => Some(i),
            ClaimSelector::Index(_) => None,
            ClaimSelector::Id(id) => self.claims.iter().position(|c| c.id == id),
        }
        .ok_or_else(|| AppError::NotFound("Claim".to_string(), selector.to_string()))?;

        let chosen = self.claims.swap_remove(position);
        let verified_by = verified_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_VERIFIER.to_string());

        let record = DeliveryRecord {
            claim_id: chosen.id,
            recipient: chosen.identity,
            claimed_at: chosen.claimed_at,
            delivered_at: now,
            verified_by,
        };

        self.claims.clear();
        self.status = ItemStatus::Delivered;
        self.delivery_record = Some(record.clone());
        Ok(record)
    }

    /// Resets an expired item: drops its claims, reopens it and starts a
    /// fresh window at `now`. Returns the claims that were dropped.
    ///
    /// Callers check `is_expired` first; on a non-expired item this is a no-op.
    pub fn expire_claims(&mut self, now: DateTime<Utc>, window: VerificationWindow) -> Vec<Claim> {
        if !self.is_expired(now) {
            return Vec::new();
        }
        let expired = std::mem::take(&mut self.claims);
        self.status = ItemStatus::Available;
        self.verification_deadline = Some(window.compute_deadline(now));
        expired
    }

    /// Applies a guard's edit. Only `available` items may be edited.
    pub fn apply_update(&mut self, update: ItemUpdate, today: NaiveDate) -> Result<()> {
        if self.status != ItemStatus::Available {
            return Err(AppError::invalid_state("Only available items can be edited"));
        }

        // Validate everything before touching the item.
        let name = update.name.as_deref().map(checked_name).transpose()?;
        let description = match update.description {
            Some(d) => Some(checked_description(Some(d))?),
            None => None,
        };
        let category = update.category.as_deref().map(str::parse::<Category>).transpose()?;
        let location = update.location.as_deref().map(str::parse::<Location>).transpose()?;
        let image_url = update.image_url.as_deref().map(checked_image_url).transpose()?;
        let found_date = update
            .found_date
            .as_deref()
            .map(|d| parse_found_date(d, today))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(found_date) = found_date {
            self.found_date = found_date;
        }
        Ok(())
    }

    /// Case-insensitive match on name, description, category and location.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(&self.name)
            || self.description.as_deref().is_some_and(hit)
            || hit(self.category.as_str())
            || hit(self.location.as_str())
    }
}

fn checked_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Please add an item name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation("Name cannot be more than 100 characters"));
    }
    Ok(name.to_string())
}

fn checked_description(raw: Option<String>) -> Result<Option<String>> {
    let description = raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
    if description
        .as_deref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(AppError::validation("Description cannot be more than 500 characters"));
    }
    Ok(description)
}

fn checked_image_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(AppError::validation("Please upload an image"));
    }
    Ok(url.to_string())
}
