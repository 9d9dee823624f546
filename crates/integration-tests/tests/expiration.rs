//! Expiration sweep behaviour over the in-memory store, including the
//! background scheduler under paused time.

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use common::{found_item, student, t0, App};
use domains::{Clock, ItemStatus};
use services::ExpirationScheduler;

#[tokio::test]
async fn lapsed_claim_resets_item_and_notifies_claimant() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.clock.advance(Duration::hours(1));
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    app.outbox.take();

    app.clock.set(t0() + Duration::hours(25));
    let report = app.sweeper.run(app.clock.now()).await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.reset, 1);
    assert_eq!(report.notified, 1);
    assert_eq!(report.failed, 0);

    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Available);
    assert!(stored.claims().is_empty());
    assert_eq!(stored.verification_deadline(), Some(t0() + Duration::hours(49)));

    let sent = app.outbox.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "12345@college.edu");
    assert_eq!(sent[0].subject, "Lost & Found: Your Claim Has Expired");
}

#[tokio::test]
async fn second_sweep_at_the_same_instant_is_a_no_op() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    app.clock.advance(Duration::hours(30));

    let now = app.clock.now();
    app.sweeper.run(now).await;
    let before = app.items.get_item(item.id).await.unwrap();
    let sent = app.outbox.sent().len();

    let again = app.sweeper.run(now).await;
    assert_eq!(again.processed, 0);
    assert_eq!(again.notified, 0);
    assert_eq!(app.items.get_item(item.id).await.unwrap(), before);
    assert_eq!(app.outbox.sent().len(), sent);
}

#[tokio::test]
async fn deadline_equal_to_now_is_not_yet_expired() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();

    let report = app.sweeper.run(t0() + Duration::hours(24)).await;
    assert_eq!(report.processed, 0);
    assert_eq!(app.items.get_item(item.id).await.unwrap().status(), ItemStatus::Claimed);

    let report = app
        .sweeper
        .run(t0() + Duration::hours(24) + Duration::seconds(1))
        .await;
    assert_eq!(report.reset, 1);
}

#[tokio::test]
async fn unclaimed_items_get_a_fresh_window_without_notices() {
    let app = App::new();
    let item = app.items.create_item(found_item("Umbrella")).await.unwrap();

    app.clock.advance(Duration::hours(26));
    let report = app.sweeper.run(app.clock.now()).await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.reset, 0);
    assert_eq!(report.notified, 0);

    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Available);
    assert_eq!(stored.verification_deadline(), Some(t0() + Duration::hours(50)));
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn delivered_items_are_never_swept() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    app.delivery
        .deliver(item.id, domains::ClaimSelector::Index(0), Some("Ravi".into()))
        .await
        .unwrap();

    app.clock.advance(Duration::days(10));
    let report = app.sweeper.run(app.clock.now()).await;
    assert_eq!(report.processed, 0);
    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Delivered);
    assert_eq!(stored.delivery_record().unwrap().verified_by, "Ravi");
}

#[tokio::test]
async fn one_refused_address_does_not_stop_the_others() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("11111")).await.unwrap();
    app.claims.submit_claim(item.id, student("22222")).await.unwrap();
    app.outbox.take();
    app.outbox.reject("11111@college.edu");

    app.clock.advance(Duration::hours(25));
    let report = app.sweeper.run(app.clock.now()).await;
    assert_eq!(report.reset, 1);
    assert_eq!(report.notified, 1);
    assert_eq!(report.notify_failed, 1);

    let sent = app.outbox.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "22222@college.edu");
    assert!(app.items.get_item(item.id).await.unwrap().claims().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scheduler_sweeps_on_start_and_stops_cleanly() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    app.clock.advance(Duration::hours(25));

    let handle = ExpirationScheduler::new(Arc::clone(&app.sweeper), app.clock.clone())
        .with_interval(StdDuration::from_secs(60))
        .start();
    tokio::time::sleep(StdDuration::from_millis(1)).await;

    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Available);
    assert_eq!(app.sweeper.metrics().runs.get(), 1);

    handle.shutdown().await;
    tokio::time::sleep(StdDuration::from_secs(600)).await;
    assert_eq!(app.sweeper.metrics().runs.get(), 1);
}

#[tokio::test]
async fn claim_at_the_deadline_instant_keeps_the_deadline() {
    let app = App::new();
    let item = app.items.create_item(found_item("Phone")).await.unwrap();
    let deadline = item.verification_deadline().unwrap();

    app.clock.set(deadline);
    let receipt = app.claims.submit_claim(item.id, student("12345")).await.unwrap();
    assert_eq!(receipt.verification_deadline, deadline);

    let report = app.sweeper.run(deadline).await;
    assert_eq!(report.processed, 0);
    let stored = app.items.get_item(item.id).await.unwrap();
    assert_eq!(stored.status(), ItemStatus::Claimed);
    assert_eq!(stored.verification_deadline(), Some(deadline));
    assert_eq!(stored.claims().len(), 1);
}
