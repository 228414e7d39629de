//! The dispatch worker: formats fired events and pushes them through the
//! delivery channel, retrying transient failures with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use minaret_core::types::Notification;

use crate::channel::DeliveryChannel;
use crate::error::{DeliveryError, Result};
use crate::message;

/// First retry delay; doubles per attempt.
const BACKOFF_BASE_SECS: u64 = 2;
/// Ceiling for a single backoff delay.
const BACKOFF_MAX_SECS: u64 = 30;

pub struct Dispatcher {
    channel: Arc<dyn DeliveryChannel>,
    recipient: String,
    timezone: Tz,
    max_attempts: u32,
}

impl Dispatcher {
    pub fn new(
        channel: Arc<dyn DeliveryChannel>,
        recipient: impl Into<String>,
        timezone: Tz,
        max_attempts: u32,
    ) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            timezone,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Worker loop: drain the notification channel until all senders hang up.
    ///
    /// No outcome here is fatal: failed deliveries are logged and the loop
    /// moves on to the next notification.
    pub async fn run(self, mut rx: mpsc::Receiver<Notification>) {
        info!(channel = self.channel.name(), "dispatcher started");
        while let Some(notification) = rx.recv().await {
            if let Err(e) = self.dispatch(&notification).await {
                match &notification {
                    Notification::Prayer(event) => {
                        error!(event = %event.id, error = %e, "notification not delivered")
                    }
                    Notification::Online(_) => {
                        warn!(error = %e, "online notice not delivered")
                    }
                }
            }
        }
        info!("dispatcher stopped");
    }

    /// Deliver one notification. Prayer events get the retry policy; online
    /// notices get a single best-effort attempt.
    pub async fn dispatch(&self, notification: &Notification) -> Result<()> {
        match notification {
            Notification::Prayer(event) => {
                let body = message::event_body(event, self.timezone);
                self.send_with_retry(&event.id, &body).await
            }
            Notification::Online(notice) => {
                let body = message::online_body(notice);
                self.channel.send(&self.recipient, &body).await
            }
        }
    }

    /// Up to `max_attempts` sends with 2 s → 4 s → … → 30 s backoff between
    /// them. Fatal errors short-circuit immediately.
    async fn send_with_retry(&self, context: &str, body: &str) -> Result<()> {
        let mut delay_secs = BACKOFF_BASE_SECS;
        for attempt in 1..=self.max_attempts {
            match self.channel.send(&self.recipient, body).await {
                Ok(()) => {
                    info!(event = context, attempt, "notification delivered");
                    return Ok(());
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt == self.max_attempts => return Err(e),
                Err(e) => {
                    warn!(
                        event = context,
                        attempt,
                        max = self.max_attempts,
                        error = %e,
                        retry_in_secs = delay_secs,
                        "delivery failed, backing off"
                    );
                    sleep(Duration::from_secs(delay_secs)).await;
                    delay_secs = (delay_secs * 2).min(BACKOFF_MAX_SECS);
                }
            }
        }
        // The loop always returns from one of the arms above.
        Err(DeliveryError::Retryable("retry budget exhausted".to_string()))
    }
}
