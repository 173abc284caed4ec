//! Configuration management for P2PBot
//!
//! Loads from config files + environment variables via .env

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub market: MarketConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Bot version tag for logging
    pub tag: String,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_url: String,
    /// Bot token (TOKEN env var on the hosting platform)
    #[serde(default)]
    pub token: Option<String>,
    /// Long-poll timeout for getUpdates in seconds
    pub poll_timeout_secs: u64,
    /// Delay before polling again after a transport error in milliseconds
    pub reconnect_delay_ms: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// P2P advertisement search endpoint
    pub url: String,
    /// Asset symbol (USDT)
    pub asset: String,
    /// Fiat currency code (VES)
    pub fiat: String,
    /// Result page requested from the backend
    pub page: u32,
    /// Rows when a listing command has no argument
    pub default_rows: u32,
    /// Fixed rows for the average shortcut
    pub average_rows: u32,
    /// Upper bound accepted for a row-count argument
    pub max_rows: u32,
    /// Outbound request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Malformed records tolerated per response (None = unlimited, 0 = strict)
    #[serde(default)]
    pub max_malformed: Option<usize>,
    pub user_agent: String,
    pub origin: String,
    pub referer: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Serve the liveness probe
    pub enabled: bool,
    /// Listen port (PORT env var on the hosting platform)
    pub port: u16,
    /// Static acknowledgement body
    pub ack: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("bot.tag", env!("CARGO_PKG_VERSION"))?
            // Telegram defaults
            .set_default("telegram.api_url", "https://api.telegram.org")?
            .set_default("telegram.poll_timeout_secs", 30)?
            .set_default("telegram.reconnect_delay_ms", 5000)?
            // Market defaults
            .set_default(
                "market.url",
                "https://p2p.binance.com/bapi/c2c/v2/friendly/c2c/adv/search",
            )?
            .set_default("market.asset", "USDT")?
            .set_default("market.fiat", "VES")?
            .set_default("market.page", 1)?
            .set_default("market.default_rows", 10)?
            .set_default("market.average_rows", 20)?
            .set_default("market.max_rows", 20)?
            .set_default("market.request_timeout_ms", 15_000)?
            .set_default(
                "market.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/126.0 Safari/537.36",
            )?
            .set_default("market.origin", "https://p2p.binance.com")?
            .set_default("market.referer", "https://p2p.binance.com/en")?
            .set_default("market.accept_language", "es-ES,es;q=0.9,en;q=0.8")?
            // Health defaults
            .set_default("health.enabled", true)?
            .set_default("health.port", 8080)?
            .set_default("health.ack", "Bot activo ✅")?
            // Logging defaults
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (P2PBOT_*)
            .add_source(Environment::with_prefix("P2PBOT").separator("__"))
            // Hosting platform variables win over everything else
            .set_override_option("telegram.token", non_empty_env("TOKEN"))?
            .set_override_option("health.port", non_empty_env("PORT"))?
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Check value ranges that the deserializer cannot express
    pub fn validate(&self) -> Result<()> {
        let market = &self.market;

        if market.max_rows == 0 {
            bail!("market.max_rows must be at least 1");
        }
        for (name, rows) in [
            ("market.default_rows", market.default_rows),
            ("market.average_rows", market.average_rows),
        ] {
            if rows == 0 || rows > market.max_rows {
                bail!("{} must be between 1 and {}", name, market.max_rows);
            }
        }
        if market.page == 0 {
            bail!("market.page must be at least 1");
        }
        if market.request_timeout_ms == 0 {
            bail!("market.request_timeout_ms must be greater than zero");
        }

        Ok(())
    }

    /// Token required by the chat transport
    pub fn require_token(&self) -> Result<&str> {
        match self.telegram.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!("Required environment variable TOKEN is not set"),
        }
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "bot={} pair={}/{} rows={}/{}/{} timeout_ms={} health={}:{}",
            self.bot.tag,
            self.market.asset,
            self.market.fiat,
            self.market.default_rows,
            self.market.average_rows,
            self.market.max_rows,
            self.market.request_timeout_ms,
            self.health.enabled,
            self.health.port
        )
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
