//! Min / max / mean over a ranked set of advertisements

use rust_decimal::Decimal;

use crate::error::{MarketError, Result};
use crate::types::{Advertisement, MarketStats};

/// Fails with `EmptyResult` on an empty set so that "no listings" is never
/// reported as a zero-priced market.
pub fn aggregate(ranked: &[Advertisement]) -> Result<MarketStats> {
    let first = ranked.first().ok_or(MarketError::EmptyResult)?.price;

    let (min, max) = ranked.iter().fold((first, first), |(min, max), ad| {
        (min.min(ad.price), max.max(ad.price))
    });
    let count = ranked.len();

    let sum = ranked
        .iter()
        .try_fold(Decimal::ZERO, |sum, ad| sum.checked_add(ad.price));
    let mean = match sum {
        Some(sum) => sum / Decimal::from(count),
        None => running_mean(ranked)?.clamp(min, max),
    };

    Ok(MarketStats {
        min,
        max,
        mean,
        count,
    })
}

/// Incremental mean for sets whose plain sum does not fit in a `Decimal`
fn running_mean(ranked: &[Advertisement]) -> Result<Decimal> {
    let out_of_range = || MarketError::Schema("price mean out of range".to_string());
    let mut mean = Decimal::ZERO;
    for (index, ad) in ranked.iter().enumerate() {
        let step = ad.price.checked_sub(mean).ok_or_else(out_of_range)? / Decimal::from(index + 1);
        mean = mean.checked_add(step).ok_or_else(out_of_range)?;
    }
    Ok(mean)
}
