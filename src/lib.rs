//! P2PBot Library
//!
//! Telegram bot reporting Binance P2P listings ranked by price

pub mod bot;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod market;
pub mod types;
