//! Notifier that renders each email and writes it to the log instead of
//! handing it to a mail server.

use async_trait::async_trait;
use domains::{Notification, Notifier, NotifyError};
use tracing::info;

use crate::render::{render, MailSettings};

pub struct LogNotifier {
    settings: MailSettings,
}

impl LogNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let message = render(&notification, &self.settings)?;
        info!(
            kind = notification.kind(),
            item_id = %notification.item_id(),
            to = %message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "email rendered"
        );
        Ok(())
    }
}
