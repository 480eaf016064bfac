//! Pip Value
//!
//! USD value of one pip for one standard lot (100,000 units of base
//! currency). Only USD accounts and pairs with a USD leg are supported;
//! everything else returns `None` so the caller decides the fallback.

use rust_decimal::Decimal;

/// Units of base currency in a standard lot.
pub const STANDARD_LOT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Pip size for most pairs (0.0001).
pub const PIP_SIZE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Pip size for JPY-quoted pairs (0.01).
pub const JPY_PIP_SIZE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

const USD: &str = "USD";
const JPY: &str = "JPY";

/// A `BASE/QUOTE` currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// Parse `"BASE/QUOTE"`. Both legs must be non-empty and alphabetic.
    #[must_use]
    pub fn parse(pair: &str) -> Option<Self> {
        let (base, quote) = pair.trim().split_once('/')?;
        let valid = |leg: &str| !leg.is_empty() && leg.chars().all(|c| c.is_ascii_alphabetic());
        if !valid(base) || !valid(quote) {
            return None;
        }

        Some(Self {
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        })
    }

    /// Base currency.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency.
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Whether the quote currency is JPY.
    #[must_use]
    pub fn is_jpy_quoted(&self) -> bool {
        self.quote == JPY
    }

    /// Smallest standard price increment for this pair.
    #[must_use]
    pub fn pip_size(&self) -> Decimal {
        if self.is_jpy_quoted() {
            JPY_PIP_SIZE
        } else {
            PIP_SIZE
        }
    }
}

/// Input for [`pip_value_per_lot`].
#[derive(Debug, Clone, Copy)]
pub struct PipValueRequest<'a> {
    /// Pair in `BASE/QUOTE` form.
    pub pair: &'a str,
    /// Current price of the pair.
    pub price: f64,
    /// Account currency; only `"USD"` is supported.
    pub account_currency: &'a str,
}

/// USD pip value per standard lot, or `None` if it cannot be computed.
#[must_use]
pub fn pip_value_per_lot(request: &PipValueRequest<'_>) -> Option<Decimal> {
    if request.account_currency != USD {
        return None;
    }

    let pair = CurrencyPair::parse(request.pair)?;

    if !request.price.is_finite() || request.price <= 0.0 {
        return None;
    }

    let pip_value_in_quote = pair.pip_size() * STANDARD_LOT;

    if pair.quote() == USD {
        Some(pip_value_in_quote)
    } else if pair.base() == USD {
        let price = Decimal::try_from(request.price).ok()?;
        if price.is_zero() {
            return None;
        }
        pip_value_in_quote.checked_div(price)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;

    fn request<'a>(pair: &'a str, price: f64, account_currency: &'a str) -> PipValueRequest<'a> {
        PipValueRequest {
            pair,
            price,
            account_currency,
        }
    }

    #[test]
    fn usd_quoted_pair_is_ten_dollars() {
        let value = pip_value_per_lot(&request("EUR/USD", 1.10, "USD")).unwrap();
        assert_eq!(value, dec!(10));
    }

    #[test]
    fn usd_base_pair_converts_by_price() {
        let value = pip_value_per_lot(&request("USD/JPY", 150.0, "USD")).unwrap();
        assert!((value - dec!(6.6667)).abs() < dec!(0.0001));
    }

    #[test]
    fn usd_base_non_jpy_pair() {
        let value = pip_value_per_lot(&request("USD/CHF", 0.8, "USD")).unwrap();
        assert!((value - dec!(12.5)).abs() < dec!(0.000001));
    }

    #[test_case("EUR/GBP", 0.85, "USD" ; "cross pair")]
    #[test_case("EUR/USD", 1.10, "EUR" ; "non usd account")]
    #[test_case("EURUSD", 1.10, "USD" ; "missing slash")]
    #[test_case("EUR/", 1.10, "USD" ; "empty quote")]
    #[test_case("EUR/US1", 1.10, "USD" ; "non alphabetic leg")]
    #[test_case("EUR/USD", 0.0, "USD" ; "zero price")]
    #[test_case("EUR/USD", -1.0, "USD" ; "negative price")]
    #[test_case("USD/JPY", f64::NAN, "USD" ; "nan price")]
    #[test_case("USD/JPY", f64::INFINITY, "USD" ; "infinite price")]
    fn cannot_compute(pair: &str, price: f64, account: &str) {
        assert!(pip_value_per_lot(&request(pair, price, account)).is_none());
    }

    #[test]
    fn pair_parsing_and_pip_size() {
        let pair = CurrencyPair::parse(" gbp/jpy ").unwrap();
        assert_eq!(pair.base(), "GBP");
        assert_eq!(pair.quote(), "JPY");
        assert!(pair.is_jpy_quoted());
        assert_eq!(pair.pip_size(), dec!(0.01));
        assert_eq!(CurrencyPair::parse("EUR/USD").unwrap().pip_size(), dec!(0.0001));
    }
}
