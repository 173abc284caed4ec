//! P2P search REST client
//!
//! One POST per query, fixed timeout, no retry.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT},
    Client,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::types::Query;

/// Anything able to answer a market query with the raw backend payload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self, query: &Query) -> Result<serde_json::Value>;
}

/// HTTP client for the P2P advertisement search endpoint
#[derive(Debug, Clone)]
pub struct P2pClient {
    client: Client,
    url: String,
}

impl P2pClient {
    /// Create a new client from the market section of the config
    pub fn new(cfg: &MarketConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&cfg.origin).context("Invalid market.origin header value")?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&cfg.referer).context("Invalid market.referer header value")?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .context("Invalid market.user_agent header value")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&cfg.accept_language)
                .context("Invalid market.accept_language header value")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: cfg.url.clone(),
        })
    }
}

#[async_trait]
impl ListingSource for P2pClient {
    async fn fetch_listings(&self, query: &Query) -> Result<serde_json::Value> {
        let started = Instant::now();
        debug!(
            direction = %query.direction,
            rows = query.rows,
            page = query.page,
            pair = %query.pair,
            "📥 Fetching P2P listings"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&query.to_request())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, "Could not read P2P error body");
                    String::new()
                }
            };
            warn!(
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "P2P backend returned an error status"
            );
            return Err(MarketError::backend(status, &body));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                MarketError::Schema(format!("body is not JSON: {e}"))
            } else {
                MarketError::Fetch(e)
            }
        })?;

        info!(
            direction = %query.direction,
            rows = query.rows,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✅ P2P listings fetched"
        );

        Ok(payload)
    }
}
