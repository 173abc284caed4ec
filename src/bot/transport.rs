//! Chat transport: Telegram Bot API over long polling
//!
//! Endpoints: https://core.telegram.org/bots/api#getupdates and #sendmessage

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::error::truncate_chars;

/// Telegram rejects messages longer than this
const MAX_MESSAGE_CHARS: usize = 4096;

/// Extra time on top of the long-poll timeout before the HTTP call gives up
const POLL_GRACE_SECS: u64 = 10;

/// One inbound update; `message` is None for updates we do not act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: String,
}

/// Receives chat messages and delivers replies
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for updates newer than `offset`
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>>;

    /// Send `text` to `chat_id`
    async fn reply(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            bail!(
                "Telegram {} failed: {}",
                method,
                self.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        self.result
            .with_context(|| format!("Telegram {method} returned no result"))
    }
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    update_id: i64,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    chat: RawChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

impl From<RawUpdate> for Update {
    fn from(raw: RawUpdate) -> Self {
        let message = raw.message.and_then(|m| {
            m.text.map(|text| IncomingMessage {
                chat_id: m.chat.id,
                text,
            })
        });
        Update {
            update_id: raw.update_id,
            message,
        }
    }
}

/// Bot API client. The token is part of every URL, so URLs are never logged
/// and transport errors are stripped of them.
pub struct TelegramTransport {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramTransport {
    pub fn new(cfg: &TelegramConfig, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.poll_timeout_secs + POLL_GRACE_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", cfg.api_url.trim_end_matches('/'), token),
            poll_timeout_secs: cfg.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut params = vec![("timeout", self.poll_timeout_secs.to_string())];
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let response: ApiResponse<Vec<RawUpdate>> = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&params)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed GET getUpdates")?
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed parsing getUpdates response")?;

        let updates: Vec<Update> = response
            .into_result("getUpdates")?
            .into_iter()
            .map(Update::from)
            .collect();

        debug!(count = updates.len(), "Telegram updates received");
        Ok(updates)
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": truncate_chars(text, MAX_MESSAGE_CHARS - 1),
        });

        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed POST sendMessage")?
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed parsing sendMessage response")?;

        response.into_result("sendMessage")?;
        Ok(())
    }
}
