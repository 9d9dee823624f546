//! lostfound/crates/notify-adapters/src/lib.rs
//!
//! `Notifier` implementations and the HTML email templates they render.

pub mod log;
pub mod outbox;
pub mod render;

pub use log::LogNotifier;
pub use outbox::OutboxNotifier;
pub use render::{render, EmailMessage, MailSettings};
