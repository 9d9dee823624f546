//! Shared wiring for the cross-crate tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use domains::{ClaimantIdentity, ItemRepository, ManualClock, NewItem, VerificationWindow};
use notify_adapters::{MailSettings, OutboxNotifier};
use services::{ClaimService, DeliveryService, ExpirationSweeper, ItemService};
use storage_adapters::InMemoryItemRepository;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
}

pub struct App {
    pub repo: Arc<InMemoryItemRepository>,
    pub clock: Arc<ManualClock>,
    pub outbox: Arc<OutboxNotifier>,
    pub items: ItemService,
    pub claims: ClaimService,
    pub delivery: DeliveryService,
    pub sweeper: Arc<ExpirationSweeper>,
}

impl App {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryItemRepository::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let outbox = Arc::new(OutboxNotifier::new(MailSettings::default()));
        let window = VerificationWindow::default();

        let repo_port: Arc<dyn ItemRepository> = repo.clone();
        Self {
            items: ItemService::new(repo_port.clone(), clock.clone(), window),
            claims: ClaimService::new(repo_port.clone(), outbox.clone(), clock.clone(), window),
            delivery: DeliveryService::new(repo_port.clone(), clock.clone()),
            sweeper: Arc::new(ExpirationSweeper::new(repo_port, outbox.clone(), window)),
            repo,
            clock,
            outbox,
        }
    }
}

pub fn found_item(name: &str) -> NewItem {
    NewItem {
        name: name.into(),
        description: Some("Left near the stairs".into()),
        category: "Electronics".into(),
        location: "F1 Building".into(),
        image_url: format!("https://img.example/{}.jpg", name.replace(' ', "-")),
        found_date: "2024-03-10".into(),
        added_by: None,
    }
}

pub fn student(roll: &str) -> ClaimantIdentity {
    ClaimantIdentity::Student {
        student_name: format!("Student {roll}"),
        roll_number: roll.into(),
        study_year: "BE".into(),
        contact_number: "9876543210".into(),
        email: format!("{roll}@college.edu"),
    }
}

pub fn staff(name: &str) -> ClaimantIdentity {
    ClaimantIdentity::Staff {
        staff_name: name.into(),
        staff_department: "Mechanical".into(),
        mobile_no: "9123456789".into(),
        email: format!("{}@college.edu", name.to_lowercase().replace(' ', ".")),
    }
}
