//! Text rendering of market snapshots
//!
//! Presentation only: entries are printed in `ranked` order and the stats
//! block prints the precomputed `MarketStats`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Advertisement, MarketSnapshot, MarketStats};

pub const UNSPECIFIED_METHODS: &str = "N/D";
pub const UNKNOWN_LIMIT: &str = "?";
const VERIFIED_MARKER: &str = " ✅";

/// Full report: header, one line per ranked advertisement, stats block
pub fn render_report(snapshot: &MarketSnapshot) -> String {
    let label = snapshot.pair.fiat_label();
    let mut out = format!(
        "🔹 Top anuncios P2P ({}, {})\n\n",
        snapshot.pair, snapshot.direction
    );

    for (index, ad) in snapshot.ranked.iter().enumerate() {
        out.push_str(&render_entry(index + 1, ad, label));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "📊 Estadísticas ({} anuncios)\n{}",
        snapshot.stats.count,
        render_stats_lines(&snapshot.stats, label)
    ));
    out
}

/// Stats-only summary used by the average shortcut
pub fn render_average(snapshot: &MarketSnapshot) -> String {
    format!(
        "📊 Promedio P2P ({}, {}, {} anuncios)\n{}",
        snapshot.pair,
        snapshot.direction,
        snapshot.stats.count,
        render_stats_lines(&snapshot.stats, snapshot.pair.fiat_label())
    )
}

fn render_entry(rank: usize, ad: &Advertisement, label: &str) -> String {
    let marker = if ad.advertiser_verified {
        VERIFIED_MARKER
    } else {
        ""
    };
    let methods = if ad.payment_methods.is_empty() {
        UNSPECIFIED_METHODS.to_string()
    } else {
        ad.payment_methods.join(", ")
    };

    format!(
        "{}. {}{} | Precio: {} {} | Límite: {}–{} {} | Métodos: {}",
        rank,
        ad.advertiser_name,
        marker,
        ad.price,
        label,
        limit(ad.min_limit),
        limit(ad.max_limit),
        label,
        methods
    )
}

fn limit(value: Option<Decimal>) -> String {
    value.map_or_else(|| UNKNOWN_LIMIT.to_string(), |v| v.to_string())
}

fn render_stats_lines(stats: &MarketStats, label: &str) -> String {
    format!(
        "• Mínimo: {} {label}\n• Máximo: {} {label}\n• Promedio: {} {label}",
        stats.min,
        stats.max,
        two_decimals(stats.mean)
    )
}

/// Round half away from zero and always print two decimals
pub fn two_decimals(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
