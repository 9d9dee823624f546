//! Notifier that keeps rendered emails in memory so they can be inspected.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use domains::{Notification, Notifier, NotifyError};
use tracing::debug;

use crate::render::{render, EmailMessage, MailSettings};

#[derive(Default)]
pub struct OutboxNotifier {
    settings: MailSettings,
    sent: Mutex<Vec<EmailMessage>>,
    rejected: Mutex<HashSet<String>>,
}

impl OutboxNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Makes every later send to `recipient` fail with a transport error.
    pub fn reject(&self, recipient: impl Into<String>) {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(recipient.into());
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn take(&self) -> Vec<EmailMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let message = render(&notification, &self.settings)?;
        let refused = self
            .rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&message.to);
        if refused {
            return Err(NotifyError::Transport(format!("recipient {} refused", message.to)));
        }
        debug!(to = %message.to, subject = %message.subject, "email queued in outbox");
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).push(message);
        Ok(())
    }
}
