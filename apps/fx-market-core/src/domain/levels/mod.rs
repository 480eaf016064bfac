//! Key Price Levels
//!
//! Collects candidate price levels from footprint signals (zone bounds and
//! fair value gap bounds), rounds them to the pair's precision, and returns
//! a small sorted, deduplicated set.
//!
//! # Footprint Shape
//!
//! ```json
//! {
//!   "signals": {
//!     "zones":        [{ "start": 1.1000, "end": 1.1050 }],
//!     "imbalanceFVG": [{ "from": 1.1010, "to": 1.1020 }]
//!   }
//! }
//! ```
//!
//! Any part may be missing or malformed; it simply contributes nothing.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Default cap on returned levels.
pub const DEFAULT_MAX_LEVELS: usize = 12;

/// Decimal places for JPY pairs.
pub const JPY_PRECISION: u32 = 3;

/// Decimal places for all other pairs.
pub const DEFAULT_PRECISION: u32 = 5;

/// Input for [`extract_key_levels`].
#[derive(Debug, Clone, Copy)]
pub struct KeyLevelRequest<'a> {
    /// Upstream footprint payload.
    pub footprint: &'a Value,
    /// Pair the footprint belongs to.
    pub pair: &'a str,
    /// Maximum levels to return. `None` uses the default; negative means 0.
    pub max_levels: Option<i64>,
}

/// Decimal precision used for a pair's levels.
#[must_use]
pub fn price_precision(pair: &str) -> u32 {
    if pair.to_ascii_uppercase().contains("JPY") {
        JPY_PRECISION
    } else {
        DEFAULT_PRECISION
    }
}

/// Extract rounded, deduplicated, ascending key levels.
#[must_use]
pub fn extract_key_levels(request: &KeyLevelRequest<'_>) -> Vec<Decimal> {
    let limit = request.max_levels.map_or(DEFAULT_MAX_LEVELS, |n| {
        usize::try_from(n).unwrap_or(0)
    });
    if limit == 0 {
        return Vec::new();
    }

    let precision = price_precision(request.pair);
    let signals = request.footprint.get("signals");

    let zones = signal_bounds(signals, "zones", "start", "end");
    let gaps = signal_bounds(signals, "imbalanceFVG", "from", "to");

    // Keyed by fixed-precision text so 1.10000 and 1.1 collapse.
    let mut unique: BTreeMap<String, Decimal> = BTreeMap::new();
    for level in zones.chain(gaps).filter_map(|v| round_level(v, precision)) {
        unique.entry(format_level(level, precision)).or_insert(level);
    }

    let mut levels: Vec<Decimal> = unique.into_values().collect();
    levels.sort_unstable();
    levels.truncate(limit);
    levels
}

fn signal_bounds<'a>(
    signals: Option<&'a Value>,
    key: &str,
    low: &'a str,
    high: &'a str,
) -> impl Iterator<Item = &'a Value> + 'a {
    signals
        .and_then(|s| s.get(key))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(move |entry| [entry.get(low), entry.get(high)])
        .flatten()
}

fn round_level(value: &Value, precision: u32) -> Option<Decimal> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }

    let decimal = Decimal::try_from(raw).ok()?;
    Some(decimal.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero))
}

fn format_level(level: Decimal, precision: u32) -> String {
    format!("{:.*}", precision as usize, level)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn footprint() -> Value {
        json!({
            "signals": {
                "zones": [{ "start": 1.10001, "end": 1.10050 }],
                "imbalanceFVG": [{ "from": 1.10001, "to": 1.10200 }]
            }
        })
    }

    fn extract(footprint: &Value, pair: &str, max_levels: Option<i64>) -> Vec<Decimal> {
        extract_key_levels(&KeyLevelRequest {
            footprint,
            pair,
            max_levels,
        })
    }

    #[test]
    fn dedups_rounds_and_sorts() {
        let levels = extract(&footprint(), "EUR/USD", None);
        assert_eq!(levels, vec![dec!(1.10001), dec!(1.1005), dec!(1.102)]);
    }

    #[test]
    fn cap_keeps_smallest() {
        let levels = extract(&footprint(), "EUR/USD", Some(2));
        assert_eq!(levels, vec![dec!(1.10001), dec!(1.1005)]);
    }

    #[test]
    fn negative_cap_is_empty() {
        assert!(extract(&footprint(), "EUR/USD", Some(-3)).is_empty());
        assert!(extract(&footprint(), "EUR/USD", Some(0)).is_empty());
    }

    #[test]
    fn jpy_pairs_use_three_decimals() {
        let fp = json!({
            "signals": {
                "zones": [{ "start": 150.12345, "end": 150.1237 }],
                "imbalanceFVG": [{ "from": 149.9996, "to": "150.5" }]
            }
        });
        let levels = extract(&fp, "USD/JPY", None);
        assert_eq!(levels, vec![dec!(150.000), dec!(150.123), dec!(150.124), dec!(150.5)]);
    }

    #[test]
    fn malformed_footprints_are_empty() {
        assert!(extract(&json!(null), "EUR/USD", None).is_empty());
        assert!(extract(&json!({}), "EUR/USD", None).is_empty());
        assert!(extract(&json!({ "signals": { "zones": "nope" } }), "EUR/USD", None).is_empty());
        assert!(extract(&json!({ "signals": { "imbalanceFVG": {} } }), "EUR/USD", None).is_empty());
    }

    #[test]
    fn skips_non_numeric_candidates() {
        let fp = json!({
            "signals": {
                "zones": [{ "start": "abc", "end": null }, 42, { "start": 1.2 }],
                "imbalanceFVG": [{ "from": true, "to": [1.0] }]
            }
        });
        assert_eq!(extract(&fp, "EUR/USD", None), vec![dec!(1.2)]);
    }

    #[test]
    fn default_cap_is_twelve() {
        let zones: Vec<Value> = (0..20)
            .map(|i| json!({ "start": 1.0 + f64::from(i) * 0.001, "end": 2.0 + f64::from(i) * 0.001 }))
            .collect();
        let fp = json!({ "signals": { "zones": zones } });
        let levels = extract(&fp, "EUR/USD", None);
        assert_eq!(levels.len(), DEFAULT_MAX_LEVELS);
        assert_eq!(levels[0], dec!(1.0));
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn precision_by_pair() {
        assert_eq!(price_precision("GBP/JPY"), 3);
        assert_eq!(price_precision("eurjpy"), 3);
        assert_eq!(price_precision("EUR/USD"), 5);
    }
}
