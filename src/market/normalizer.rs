//! Raw P2P payload -> Advertisement projection
//!
//! The envelope must carry a `data` array; anything else means the backend
//! contract changed and the whole response is rejected. Individual records
//! that fail validation are dropped and logged, the rest keep source order.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{MarketError, Result};
use crate::types::Advertisement;

const UNKNOWN_ADVERTISER: &str = "Desconocido";
const MERCHANT_USER_TYPE: &str = "merchant";

#[derive(Debug, Deserialize)]
struct RawListing {
    adv: RawAdv,
    #[serde(default, deserialize_with = "lenient")]
    advertiser: Option<RawAdvertiser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdv {
    price: Option<RawNumber>,
    #[serde(default, deserialize_with = "lenient")]
    min_single_trans_amount: Option<RawNumber>,
    #[serde(default, deserialize_with = "lenient")]
    max_single_trans_amount: Option<RawNumber>,
    #[serde(default, deserialize_with = "lenient")]
    trade_methods: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdvertiser {
    #[serde(default, deserialize_with = "lenient")]
    nick_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTradeMethod {
    #[serde(default, deserialize_with = "lenient")]
    trade_method_name: Option<String>,
}

/// Decorative fields: a value of the wrong shape reads as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Numeric fields arrive either as JSON strings or JSON numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Number(serde_json::Number),
}

impl RawNumber {
    fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            RawNumber::Text(s) => s.trim().to_string(),
            RawNumber::Number(n) => n.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

/// How many malformed records a single response may contain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizePolicy {
    /// None = unlimited, Some(0) = strict
    pub max_malformed: Option<usize>,
}

impl NormalizePolicy {
    pub fn strict() -> Self {
        Self {
            max_malformed: Some(0),
        }
    }
}

/// Validate the envelope and project every well-formed record
pub fn normalize(payload: Value, policy: NormalizePolicy) -> Result<Vec<Advertisement>> {
    let items = match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(MarketError::Schema(format!(
                    "`data` is {}, expected an array",
                    json_kind(&other)
                )))
            }
            None => return Err(MarketError::Schema("missing `data` field".to_string())),
        },
        other => {
            return Err(MarketError::Schema(format!(
                "top-level payload is {}, expected an object",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let mut dropped = 0usize;
    let mut ads = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        match project(item) {
            Ok(ad) => ads.push(ad),
            Err(reason) => {
                dropped += 1;
                warn!(index, reason = %reason, "Dropping malformed P2P record");
            }
        }
    }

    if let Some(limit) = policy.max_malformed {
        if dropped > limit {
            return Err(MarketError::Schema(format!(
                "{dropped} malformed records exceed tolerance of {limit}"
            )));
        }
    }

    debug!(total, kept = ads.len(), dropped, "P2P records normalized");
    Ok(ads)
}

fn project(item: Value) -> std::result::Result<Advertisement, String> {
    let raw: RawListing = serde_json::from_value(item).map_err(|e| e.to_string())?;

    let price = required_decimal(raw.adv.price.as_ref(), "price")?;
    if price <= Decimal::ZERO {
        return Err(format!("non-positive price {price}"));
    }
    let min_limit = optional_decimal(raw.adv.min_single_trans_amount.as_ref());
    let max_limit = optional_decimal(raw.adv.max_single_trans_amount.as_ref());

    let advertiser = raw.advertiser.unwrap_or_default();
    let advertiser_name = advertiser
        .nick_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_ADVERTISER.to_string());

    let advertiser_verified = advertiser
        .user_type
        .is_some_and(|t| t.eq_ignore_ascii_case(MERCHANT_USER_TYPE));

    let payment_methods = raw
        .adv
        .trade_methods
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| serde_json::from_value::<RawTradeMethod>(m).ok())
        .filter_map(|m| m.trade_method_name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Ok(Advertisement {
        price,
        advertiser_name,
        advertiser_verified,
        min_limit,
        max_limit,
        payment_methods,
    })
}

fn required_decimal(
    value: Option<&RawNumber>,
    field: &str,
) -> std::result::Result<Decimal, String> {
    let raw = value.ok_or_else(|| format!("missing {field}"))?;
    raw.to_decimal()
        .ok_or_else(|| format!("unparseable {field}: {raw:?}"))
}

fn optional_decimal(value: Option<&RawNumber>) -> Option<Decimal> {
    value.and_then(RawNumber::to_decimal)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record(price: Value, nick: &str) -> Value {
        json!({
            "adv": {
                "price": price,
                "minSingleTransAmount": "1000.00",
                "maxSingleTransAmount": 50000,
                "tradeMethods": [{"tradeMethodName": "Banesco"}, {"tradeMethodName": "Pago Movil"}]
            },
            "advertiser": {"nickName": nick, "userType": "merchant"}
        })
    }

    #[test]
    fn projects_string_and_number_fields() {
        let ads = normalize(
            json!({"data": [record(json!("36.50"), "alice"), record(json!(35.8), "bob")]}),
            NormalizePolicy::default(),
        )
        .unwrap();

        assert_eq!(ads.len(), 2);
        assert_eq!(ads[0].price, dec!(36.50));
        assert_eq!(ads[0].min_limit, Some(dec!(1000)));
        assert_eq!(ads[0].max_limit, Some(dec!(50000)));
        assert_eq!(ads[0].payment_methods, vec!["Banesco", "Pago Movil"]);
        assert!(ads[0].advertiser_verified);
        assert_eq!(ads[1].price, dec!(35.8));
        assert_eq!(ads[1].advertiser_name, "bob");
    }

    #[test]
    fn drops_only_malformed_records_and_keeps_order() {
        let mut missing_price = record(json!("1"), "missing");
        missing_price["adv"]
            .as_object_mut()
            .unwrap()
            .remove("price");

        let payload = json!({"data": [
            record(json!("37.1"), "first"),
            missing_price,
            record(json!("abc"), "garbage"),
            record(json!("0"), "zero"),
            json!("not an object"),
            record(json!("35.2"), "last"),
        ]});

        let ads = normalize(payload, NormalizePolicy::default()).unwrap();
        let names: Vec<_> = ads.iter().map(|a| a.advertiser_name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
    }

    #[test]
    fn strict_policy_rejects_any_malformed_record() {
        let payload = json!({"data": [record(json!("37.1"), "ok"), record(json!(null), "bad")]});
        let err = normalize(payload, NormalizePolicy::strict()).unwrap_err();
        assert!(matches!(err, MarketError::Schema(_)));
    }

    #[test]
    fn missing_or_non_array_data_is_schema_error() {
        for payload in [
            json!({"code": "000000"}),
            json!({"data": null}),
            json!({"data": {"adv": {}}}),
            json!([1, 2, 3]),
        ] {
            let err = normalize(payload.clone(), NormalizePolicy::default()).unwrap_err();
            assert!(
                matches!(err, MarketError::Schema(_)),
                "expected schema error for {payload}"
            );
        }
    }

    #[test]
    fn empty_data_array_is_not_an_error() {
        let ads = normalize(json!({"data": []}), NormalizePolicy::strict()).unwrap();
        assert!(ads.is_empty());
    }

    #[test]
    fn nameless_payment_methods_and_missing_advertiser_get_defaults() {
        let payload = json!({"data": [{
            "adv": {
                "price": "36.0",
                "minSingleTransAmount": "10",
                "maxSingleTransAmount": "20",
                "tradeMethods": [{"tradeMethodName": null}, {"identifier": "x"}, {"tradeMethodName": "Mercantil"}]
            }
        }]});

        let ads = normalize(payload, NormalizePolicy::strict()).unwrap();
        assert_eq!(ads[0].payment_methods, vec!["Mercantil"]);
        assert_eq!(ads[0].advertiser_name, UNKNOWN_ADVERTISER);
        assert!(!ads[0].advertiser_verified);
    }

    #[test]
    fn wrongly_typed_decorative_fields_keep_the_record() {
        let mut null_advertiser = record(json!("36.1"), "ignored");
        null_advertiser["advertiser"] = Value::Null;

        let mut null_method = record(json!("36.2"), "dora");
        null_method["adv"]["tradeMethods"] = json!([{"tradeMethodName": "Banesco"}, null]);

        let mut numeric_method = record(json!("36.3"), "eve");
        numeric_method["adv"]["tradeMethods"] =
            json!([{"tradeMethodName": 7}, {"tradeMethodName": "Mercantil"}]);

        let mut numeric_nick = record(json!("36.4"), "ignored");
        numeric_nick["advertiser"]["nickName"] = json!(12345);

        let mut methods_object = record(json!("36.5"), "finn");
        methods_object["adv"]["tradeMethods"] = json!({"tradeMethodName": "Banesco"});

        let payload = json!({"data": [
            null_advertiser, null_method, numeric_method, numeric_nick, methods_object
        ]});
        let ads = normalize(payload, NormalizePolicy::strict()).unwrap();

        assert_eq!(ads.len(), 5);
        assert_eq!(ads[0].advertiser_name, UNKNOWN_ADVERTISER);
        assert!(!ads[0].advertiser_verified);
        assert_eq!(ads[1].payment_methods, vec!["Banesco"]);
        assert_eq!(ads[2].payment_methods, vec!["Mercantil"]);
        assert_eq!(ads[3].advertiser_name, UNKNOWN_ADVERTISER);
        assert!(ads[3].advertiser_verified);
        assert!(ads[4].payment_methods.is_empty());
    }

    #[test]
    fn missing_or_unreadable_limits_keep_the_record() {
        let mut no_min = record(json!("36.0"), "gus");
        no_min["adv"].as_object_mut().unwrap().remove("minSingleTransAmount");

        let mut garbage_max = record(json!("36.1"), "hal");
        garbage_max["adv"]["maxSingleTransAmount"] = json!("sin límite");

        let mut null_limits = record(json!("36.2"), "ivy");
        null_limits["adv"]["minSingleTransAmount"] = Value::Null;
        null_limits["adv"]["maxSingleTransAmount"] = json!(true);

        let ads = normalize(
            json!({"data": [no_min, garbage_max, null_limits]}),
            NormalizePolicy::strict(),
        )
        .unwrap();

        assert_eq!(ads.len(), 3);
        assert_eq!(ads[0].min_limit, None);
        assert_eq!(ads[0].max_limit, Some(dec!(50000)));
        assert_eq!(ads[1].min_limit, Some(dec!(1000)));
        assert_eq!(ads[1].max_limit, None);
        assert_eq!((ads[2].min_limit, ads[2].max_limit), (None, None));
    }
}
