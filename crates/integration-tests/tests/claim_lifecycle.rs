//! End-to-end claim lifecycle through the services, the in-memory store and
//! the outbox notifier.

mod common;

use chrono::Duration;
use common::{found_item, staff, student, t0, App};
use domains::{AppError, ClaimSelector, ItemRepository, ItemStatus};

#[tokio::test]
async fn claim_sets_deadline_from_creation_time() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();

    app.clock.advance(Duration::hours(1));
    let receipt = app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    assert_eq!(receipt.verification_deadline, t0() + Duration::hours(24));

    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Claimed);
    assert_eq!(stored.claims().len(), 1);

    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "12345@college.edu");
    assert!(sent[0].html.contains("Phone"));
}

#[tokio::test]
async fn later_claims_do_not_move_the_deadline() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();

    let first = app.claims.submit_claim(item.id, student("11111")).await.unwrap();
    app.clock.advance(Duration::hours(20));
    let second = app.claims.submit_claim(item.id, staff("Meera Joshi")).await.unwrap();

    assert_eq!(first.verification_deadline, second.verification_deadline);
    assert_eq!(app.items.get_item(item.id).await.unwrap().claims().len(), 2);
}

#[tokio::test]
async fn duplicate_claim_is_rejected_even_with_different_email_case() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();

    let shouting = match student("12345") {
        domains::ClaimantIdentity::Student {
            student_name,
            roll_number,
            study_year,
            contact_number,
            email,
        } => domains::ClaimantIdentity::Student {
            student_name,
            roll_number,
            study_year,
            contact_number,
            email: email.to_uppercase(),
        },
        other => other,
    };
    let err = app.claims.submit_claim(item.id, shouting).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateClaim(_)));
    assert_eq!(app.items.get_item(item.id).await.unwrap().claims().len(), 1);
}

#[tokio::test]
async fn delivery_picks_one_of_many() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("11111")).await.unwrap();
    app.claims.submit_claim(item.id, student("22222")).await.unwrap();
    let before = app.outbox.sent().len();

    let record = app
        .delivery
        .deliver(item.id, ClaimSelector::Index(0), None)
        .await
        .unwrap();
    assert_eq!(record.recipient, student("11111"));

    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Delivered);
    assert!(stored.claims().is_empty());
    assert_eq!(stored.delivery_record(), Some(&record));
    // the unselected claimant hears nothing
    assert_eq!(app.outbox.sent().len(), before);

    let err = app
        .delivery
        .deliver(item.id, ClaimSelector::Index(0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = app.claims.submit_claim(item.id, student("33333")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn failed_confirmation_email_keeps_the_claim() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.outbox.reject("12345@college.edu");

    app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    let stored = app.repo.get(item.id).await.unwrap().unwrap();
    assert_eq!(stored.claims().len(), 1);
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn claims_on_unknown_items_are_not_found() {
    let app = App::new();
    let missing = domains::ItemId::new();
    let err = app.claims.submit_claim(missing, student("12345")).await.unwrap_err();
    assert_eq!(err, AppError::item_not_found(missing));
}

#[tokio::test]
async fn edits_are_only_allowed_while_available() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();

    let err = app
        .items
        .update_item(
            item.id,
            domains::ItemUpdate {
                name: Some("Tablet".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn delivered_item_answers_invalid_state_whatever_the_identity() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("11111")).await.unwrap();
    app.delivery
        .deliver(item.id, ClaimSelector::Index(0), None)
        .await
        .unwrap();
    let before = app.repo.get(item.id).await.unwrap().unwrap();

    let err = app.claims.submit_claim(item.id, student("12")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(app.repo.get(item.id).await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn malformed_claim_on_unknown_item_is_not_found() {
    let app = App::new();
    let missing = domains::ItemId::new();
    let err = app.claims.submit_claim(missing, student("12")).await.unwrap_err();
    assert_eq!(err, AppError::item_not_found(missing));
}
