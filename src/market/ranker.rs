//! Direction-dependent price ordering
//!
//! BUY ranks cheapest first, SELL ranks dearest first. Both sorts are stable,
//! so equal prices keep the order the backend returned them in.

use crate::types::{Advertisement, Direction};

pub fn rank(mut ads: Vec<Advertisement>, direction: Direction) -> Vec<Advertisement> {
    match direction {
        Direction::Buy => ads.sort_by(|a, b| a.price.cmp(&b.price)),
        Direction::Sell => ads.sort_by(|a, b| b.price.cmp(&a.price)),
    }
    ads
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ad(price: Decimal, name: &str) -> Advertisement {
        Advertisement {
            price,
            advertiser_name: name.to_string(),
            advertiser_verified: false,
            min_limit: Some(dec!(10)),
            max_limit: Some(dec!(100)),
            payment_methods: Vec::new(),
        }
    }

    fn sample() -> Vec<Advertisement> {
        vec![
            ad(dec!(36.5), "a"),
            ad(dec!(35.8), "b"),
            ad(dec!(36.5), "c"),
            ad(dec!(37.1), "d"),
            ad(dec!(35.8), "e"),
        ]
    }

    fn names(ads: &[Advertisement]) -> Vec<&str> {
        ads.iter().map(|a| a.advertiser_name.as_str()).collect()
    }

    #[test]
    fn buy_is_ascending_and_stable() {
        let ranked = rank(sample(), Direction::Buy);
        assert!(ranked.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(names(&ranked), vec!["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn sell_is_descending_and_stable() {
        let ranked = rank(sample(), Direction::Sell);
        assert!(ranked.windows(2).all(|w| w[0].price >= w[1].price));
        assert_eq!(names(&ranked), vec!["d", "a", "c", "b", "e"]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(rank(Vec::new(), Direction::Sell).is_empty());
    }
}
