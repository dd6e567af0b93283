//! Outbound Telegram Bot API client.
//!
//! Send failures are logged and reported as `false`; the caller decides on
//! fallbacks (e.g. plain text when a photo send fails). Nothing here is
//! fatal to the process.

pub mod update;

pub use update::{Chat, Message, Update, User};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};
use wreq::Client;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Trait for outbound chat sends - enables mocking for tests.
#[async_trait]
pub trait ChatSend: Send + Sync {
    /// Sends a Markdown text message. Returns true on success.
    async fn send_message(&self, chat_id: &str, text: &str) -> bool;

    /// Sends a photo with a Markdown caption. Returns true on success.
    async fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> bool;
}

/// Telegram Bot API client.
pub struct TelegramClient {
    client: Client,
    bot_base: String,
}

impl TelegramClient {
    /// Creates a client for the given bot token.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self> {
        Self::with_api_base(TELEGRAM_API_BASE, token, timeout_secs)
    }

    /// Creates a client against a custom API base (for testing).
    pub fn with_api_base(api_base: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;

        Ok(Self { client, bot_base: format!("{}/bot{}", api_base, token) })
    }

    /// POSTs a JSON body to one Bot API method.
    async fn call(&self, api_method: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}", self.bot_base, api_method);
        debug!("POST {}", api_method);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Telegram returned status: {}", response.status());
        }

        Ok(())
    }
}

#[async_trait]
impl ChatSend for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> bool {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        match self.call("sendMessage", body).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error sending message to chat {}: {}", chat_id, e);
                false
            }
        }
    }

    async fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> bool {
        let body = json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
            "parse_mode": "Markdown",
        });

        match self.call("sendPhoto", body).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error sending photo to chat {}: {}", chat_id, e);
                false
            }
        }
    }
}
