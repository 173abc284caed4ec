//! Core types used throughout P2PBot
//!
//! Defines the query, advertisement and snapshot shapes flowing through the
//! market pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of a P2P listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Value expected by the P2P search endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset / fiat pair queried on the P2P book (e.g. USDT/VES)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub asset: String,
    pub fiat: String,
}

impl Pair {
    pub fn new(asset: impl Into<String>, fiat: impl Into<String>) -> Self {
        Self {
            asset: asset.into().to_uppercase(),
            fiat: fiat.into().to_uppercase(),
        }
    }

    /// Label used next to prices in reports. Bolívares are shown as "Bs".
    pub fn fiat_label(&self) -> &str {
        match self.fiat.as_str() {
            "VES" => "Bs",
            other => other,
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.asset, self.fiat)
    }
}

/// Validated market query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub pair: Pair,
    pub direction: Direction,
    pub rows: u32,
    pub page: u32,
}

/// Body of the outbound search request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub asset: &'a str,
    pub fiat: &'a str,
    pub trade_type: Direction,
    pub rows: u32,
    pub page: u32,
}

impl Query {
    pub fn to_request(&self) -> SearchRequest<'_> {
        SearchRequest {
            asset: &self.pair.asset,
            fiat: &self.pair.fiat,
            trade_type: self.direction,
            rows: self.rows,
            page: self.page,
        }
    }
}

/// One priced offer on the P2P book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub price: Decimal,
    pub advertiser_name: String,
    pub advertiser_verified: bool,
    /// None when the backend omits the limit or sends something unreadable
    pub min_limit: Option<Decimal>,
    pub max_limit: Option<Decimal>,
    pub payment_methods: Vec<String>,
}

/// Price summary over a ranked set of advertisements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketStats {
    pub min: Decimal,
    pub max: Decimal,
    /// Full-precision mean; rounding happens at presentation time
    pub mean: Decimal,
    pub count: usize,
}

/// Ranked advertisements plus the stats computed over exactly that set
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub pair: Pair,
    pub direction: Direction,
    pub ranked: Vec<Advertisement>,
    pub stats: MarketStats,
}
