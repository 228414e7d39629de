use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::channel::DeliveryChannel;
use crate::error::{DeliveryError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Telegram Bot API adapter. The recipient is a chat ID.
pub struct TelegramChannel {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_base_url(bot_token, DEFAULT_API_BASE_URL)
    }

    /// Constructor with an overridden API host (tests, proxies).
    pub fn with_base_url(bot_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            bot_token: bot_token.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, recipient: &str, body: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        debug!(chat_id = recipient, "sending Telegram message");

        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "chat_id": recipient, "text": body }))
            .send()
            .await
            .map_err(|e| DeliveryError::Retryable(format!("transport error: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let description = resp
            .json::<ApiReply>()
            .await
            .ok()
            .and_then(|reply| reply.description)
            .unwrap_or_else(|| status.to_string());

        // Rate limits and server-side trouble are transient; the remaining
        // client errors (bad token, unknown chat) will not heal on retry.
        if status.as_u16() == 429 || status.is_server_error() {
            Err(DeliveryError::Retryable(description))
        } else {
            Err(DeliveryError::Fatal(description))
        }
    }
}
