//! P2P market pipeline
//!
//! query -> fetch -> normalize -> rank -> stats -> report

pub mod fetcher;
pub mod normalizer;
pub mod query;
pub mod ranker;
pub mod report;
pub mod stats;

pub use fetcher::{ListingSource, P2pClient};
pub use normalizer::{normalize, NormalizePolicy};
pub use query::{QueryDefaults, ReportKind};
pub use ranker::rank;
pub use report::{render_average, render_report};
pub use stats::aggregate;

use crate::error::Result;
use crate::types::{MarketSnapshot, Query};

/// Turn a raw backend payload into a ranked snapshot for `query`.
/// The ranked set never holds more than `query.rows` entries and stats are
/// computed over exactly that set.
pub fn snapshot_from_payload(
    query: &Query,
    payload: serde_json::Value,
    policy: NormalizePolicy,
) -> Result<MarketSnapshot> {
    let ads = normalize(payload, policy)?;
    let mut ranked = rank(ads, query.direction);
    ranked.truncate(query.rows as usize);
    let stats = aggregate(&ranked)?;

    Ok(MarketSnapshot {
        pair: query.pair.clone(),
        direction: query.direction,
        ranked,
        stats,
    })
}
